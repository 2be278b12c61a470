// This file is part of huskyprobe, a tool to verify the parameter surface of ChipWhisperer Husky capture devices.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// huskyprobe is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// huskyprobe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Generic test primitives over device getters, setters and methods.
//!
//! The [`ParameterTester`] exposes three primitives, [`test_read`](ParameterTester::test_read),
//! [`test_write`](ParameterTester::test_write) and [`test_method`](ParameterTester::test_method).
//! Each of them appends exactly one [`TestResult`] and never returns an error: any
//! [`HuskyError`] raised by the device is recorded as a failure so that the remaining
//! parameters still get tested.
//!
//! The device is borrowed per call, never owned. Getters and setters are closures over
//! that borrow, which keeps the read and write halves of a parameter from aliasing.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use huskyprobe::backends::device::Scope;
//! # use huskyprobe::tester::ParameterTester;
//! # fn example(scope: &mut dyn Scope) {
//! let mut tester = ParameterTester::new(false);
//! tester.test_write(
//!     "Repeat",
//!     "scope.glitch.repeat",
//!     scope,
//!     |s| s.glitch().repeat(),
//!     |s, v| s.glitch().set_repeat(v),
//!     &[1, 5, 10, 50, 255],
//! );
//! assert!(tester.results()[0].success);
//! # }
//! ```

use crate::error::HuskyError;
use crate::record::{TestResult, TestType, WriteAttempt};
use crate::value::ParamValue;
use log::debug;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Runs parameter tests and accumulates their results in order.
///
/// # Fields
///
/// * `verbose` - Print per-value detail while testing
/// * `interrupt` - Set from outside to stop the run at the next [`step`](Self::step)
/// * `results` - Append-only record of every test run so far
#[derive(Debug)]
pub struct ParameterTester {
    verbose: bool,
    interrupt: Arc<AtomicBool>,
    results: Vec<TestResult>,
}

impl ParameterTester {
    pub fn new(verbose: bool) -> Self {
        Self::with_interrupt(verbose, Arc::new(AtomicBool::new(false)))
    }

    /// Create a tester observing an externally owned interrupt flag.
    ///
    /// # Arguments
    ///
    /// * `verbose` - Print per-value detail while testing
    /// * `interrupt` - Flag that, once set, makes [`step`](Self::step) fail with
    ///   [`HuskyError::Interrupted`]
    pub fn with_interrupt(verbose: bool, interrupt: Arc<AtomicBool>) -> Self {
        ParameterTester {
            verbose,
            interrupt,
            results: Vec::new(),
        }
    }

    /// All results recorded so far, in the order the tests ran.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<TestResult> {
        self.results
    }

    /// Print `message` indented, if running verbosely.
    pub fn log(&self, message: impl AsRef<str>) {
        if self.verbose {
            println!("  {}", message.as_ref());
        }
    }

    /// Fail with [`HuskyError::Interrupted`] if the interrupt flag has been raised.
    pub fn check_interrupt(&self) -> Result<(), HuskyError> {
        if self.interrupt.load(Ordering::SeqCst) {
            return Err(HuskyError::Interrupted);
        }
        Ok(())
    }

    /// Announce step `index` of `total` in a suite.
    ///
    /// Steps are the points where a run can be interrupted, so the check happens before
    /// anything is printed or touched on the device.
    ///
    /// # Returns: `Result<(), HuskyError>`
    /// * `Ok(())` - Carry on with the step
    /// * `Err(HuskyError::Interrupted)` - The user asked to stop
    pub fn step(&self, index: usize, total: usize, label: &str) -> Result<(), HuskyError> {
        self.check_interrupt()?;
        let lead = if index <= 1 { "\n" } else { "" };
        println!("{lead}[{index}/{total}] {label}");
        Ok(())
    }

    fn push(&mut self, result: TestResult) -> &TestResult {
        debug!(
            "{} {} ({}): success={}",
            result.test_type, result.api_path, result.parameter, result.success
        );
        self.results.push(result);
        // just pushed, so never empty
        &self.results[self.results.len() - 1]
    }

    /// Read a parameter once.
    ///
    /// # Arguments
    ///
    /// * `name` - Human readable parameter name
    /// * `api_path` - Dotted access path of the parameter
    /// * `device` - Device the getter runs against
    /// * `get` - Reads the parameter
    ///
    /// # Returns: `&TestResult`
    /// * The appended record. `value_read` holds the value on success, `error_message` the
    ///   fault otherwise
    pub fn test_read<D, T, G>(
        &mut self,
        name: &str,
        api_path: &str,
        device: &mut D,
        get: G,
    ) -> &TestResult
    where
        D: ?Sized,
        T: Into<ParamValue>,
        G: FnOnce(&mut D) -> Result<T, HuskyError>,
    {
        let result = match get(device) {
            Ok(value) => {
                let value = value.into();
                self.log(format!("READ {api_path} = {value}"));
                TestResult::passed(name, api_path, TestType::Read, value)
            }
            Err(e) => {
                self.log(format!("READ {api_path} FAILED: {e}"));
                TestResult::failed(name, api_path, TestType::Read, e.to_string())
            }
        };
        self.push(result)
    }

    /// Write each of `test_values` and read it back, restoring the original value afterwards.
    ///
    /// See [`test_write_with`](Self::test_write_with) for the details.
    pub fn test_write<D, T, G, S>(
        &mut self,
        name: &str,
        api_path: &str,
        device: &mut D,
        get: G,
        set: S,
        test_values: &[T],
    ) -> &TestResult
    where
        D: ?Sized,
        T: Clone + Into<ParamValue>,
        G: FnMut(&mut D) -> Result<T, HuskyError>,
        S: FnMut(&mut D, T) -> Result<(), HuskyError>,
    {
        self.test_write_with(name, api_path, device, get, set, test_values, true)
    }

    /// Write each of `test_values` and read it back.
    ///
    /// The original value is read first; if that fails the whole test fails with no
    /// per-value detail. Every value is then written and read back in order. A fault on
    /// either half is recorded as a non-matching attempt and the loop carries on with the
    /// next value. Finally the original value is written back if `restore_original` is set,
    /// ignoring any fault while doing so.
    ///
    /// The test succeeds if **any** value round-trips, see [`ParamValue::matches`] for what
    /// counts as a round trip.
    ///
    /// # Arguments
    ///
    /// * `name` - Human readable parameter name
    /// * `api_path` - Dotted access path of the parameter
    /// * `device` - Device the getter and setter run against
    /// * `get` - Reads the parameter
    /// * `set` - Writes the parameter
    /// * `test_values` - Values to try, in order
    /// * `restore_original` - Write the original value back when done
    ///
    /// # Returns: `&TestResult`
    /// * The appended record, with `value_read` holding the original value and
    ///   `value_written` one [`WriteAttempt`] per tested value
    #[allow(clippy::too_many_arguments)]
    pub fn test_write_with<D, T, G, S>(
        &mut self,
        name: &str,
        api_path: &str,
        device: &mut D,
        mut get: G,
        mut set: S,
        test_values: &[T],
        restore_original: bool,
    ) -> &TestResult
    where
        D: ?Sized,
        T: Clone + Into<ParamValue>,
        G: FnMut(&mut D) -> Result<T, HuskyError>,
        S: FnMut(&mut D, T) -> Result<(), HuskyError>,
    {
        let original = match get(device) {
            Ok(v) => v,
            Err(e) => {
                self.log(format!("WRITE TEST {api_path} FAILED: {e}"));
                let failed =
                    TestResult::failed(name, api_path, TestType::ReadWrite, e.to_string());
                return self.push(failed);
            }
        };
        let original_value: ParamValue = original.clone().into();
        self.log(format!("Original {api_path} = {original_value}"));

        let mut attempts = Vec::with_capacity(test_values.len());
        for test_val in test_values {
            let attempted: ParamValue = test_val.clone().into();
            let readback = set(device, test_val.clone()).and_then(|_| get(device));
            match readback {
                Ok(readback) => {
                    let readback: ParamValue = readback.into();
                    let matched = attempted.matches(&readback);
                    self.log(format!(
                        "  SET {attempted} -> READ {readback} {}",
                        if matched { "OK" } else { "MISMATCH" }
                    ));
                    attempts.push(WriteAttempt {
                        attempted,
                        readback: Some(readback),
                        matched,
                    });
                }
                Err(e) => {
                    self.log(format!("  SET {attempted} FAILED: {e}"));
                    attempts.push(WriteAttempt {
                        attempted,
                        readback: None,
                        matched: false,
                    });
                }
            }
        }

        if restore_original {
            match set(device, original) {
                Ok(()) => self.log(format!("Restored {api_path} = {original_value}")),
                Err(e) => debug!("Ignoring failure to restore {api_path}: {e}"),
            }
        }

        let success = attempts.iter().any(|a| a.matched);
        let result = TestResult {
            success,
            value_written: attempts,
            ..TestResult::passed(name, api_path, TestType::ReadWrite, original_value)
        }
        .with_notes(format!("Tested {} values", test_values.len()));
        self.push(result)
    }

    /// Call a method once with `args`.
    ///
    /// # Arguments
    ///
    /// * `name` - Human readable name of the call
    /// * `api_path` - Dotted access path of the method
    /// * `device` - Device the method runs against
    /// * `method` - Performs the call
    /// * `args` - Arguments handed to `method`, also recorded in the notes
    ///
    /// # Returns: `&TestResult`
    /// * The appended record, holding the return value on success
    pub fn test_method<D, A, R, M>(
        &mut self,
        name: &str,
        api_path: &str,
        device: &mut D,
        method: M,
        args: A,
    ) -> &TestResult
    where
        D: ?Sized,
        A: Debug,
        R: Into<ParamValue>,
        M: FnOnce(&mut D, A) -> Result<R, HuskyError>,
    {
        let args_text = format!("{args:?}");
        let result = match method(device, args) {
            Ok(value) => {
                let value = value.into();
                self.log(format!("METHOD {api_path}({args_text}) = {value}"));
                TestResult::passed(name, api_path, TestType::Method, value)
                    .with_notes(format!("Called with args: {args_text}"))
            }
            Err(e) => {
                self.log(format!("METHOD {api_path}({args_text}) FAILED: {e}"));
                TestResult::failed(name, api_path, TestType::Method, e.to_string())
            }
        };
        self.push(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    /// A single register that can be told to fault on reads, on writes of certain values
    /// or on every write once a number of writes has happened.
    #[derive(Debug, Default)]
    struct Register<T> {
        value: T,
        fail_reads: bool,
        rejected: Vec<T>,
        writes_before_failing: Option<usize>,
        writes: usize,
    }

    impl<T: Clone + PartialEq> Register<T> {
        fn holding(value: T) -> Self {
            Register {
                value,
                fail_reads: false,
                rejected: Vec::new(),
                writes_before_failing: None,
                writes: 0,
            }
        }

        fn get(&mut self) -> Result<T, HuskyError> {
            if self.fail_reads {
                return Err(HuskyError::device("register", "unsupported"));
            }
            Ok(self.value.clone())
        }

        fn set(&mut self, value: T) -> Result<(), HuskyError> {
            if self.writes_before_failing == Some(self.writes) {
                return Err(HuskyError::device("register", "link lost"));
            }
            self.writes += 1;
            if self.rejected.contains(&value) {
                return Err(HuskyError::device("register", "value out of range"));
            }
            self.value = value;
            Ok(())
        }
    }

    #[gtest]
    fn test_read_records_value() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(4592u32);
        let result = tester.test_read("Steps", "reg", &mut reg, |r| r.get());

        expect_that!(result.success, eq(true));
        expect_that!(result.test_type, eq(TestType::Read));
        expect_that!(&result.value_read, eq(&ParamValue::Int(4592)));
        expect_that!(result.error_message.as_str(), eq(""));
    }

    #[gtest]
    fn test_read_absorbs_fault() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(true);
        reg.fail_reads = true;
        tester.test_read("Flag", "reg", &mut reg, |r| r.get());

        assert_that!(tester.results().len(), eq(1));
        let result = &tester.results()[0];
        expect_that!(result.success, eq(false));
        expect_that!(result.error_message.as_str(), contains_substring("unsupported"));
        expect_that!(result.value_read.is_none(), eq(true));
    }

    #[gtest]
    fn test_write_round_trips_every_value() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(1u32);
        let result = tester.test_write(
            "Repeat",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, v| r.set(v),
            &[1, 5, 10, 50, 255],
        );

        expect_that!(result.success, eq(true));
        expect_that!(result.value_written.len(), eq(5));
        expect_that!(result.matched_count(), eq(5));
        expect_that!(&result.value_read, eq(&ParamValue::Int(1)));
        expect_that!(result.notes.as_str(), eq("Tested 5 values"));
        expect_that!(reg.value, eq(1));
    }

    #[gtest]
    fn test_write_succeeds_if_any_value_matches() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(2000u32);
        reg.rejected = vec![0, 4592];
        let result = tester.test_write(
            "Width",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, v| r.set(v),
            &[0, 1000, 4592],
        );

        expect_that!(result.success, eq(true));
        let matched: Vec<bool> = result.value_written.iter().map(|a| a.matched).collect();
        expect_that!(matched, eq(&vec![false, true, false]));
        expect_that!(&result.value_written[0].readback, none());
        expect_that!(
            &result.value_written[1].readback,
            some(eq(&ParamValue::Int(1000)))
        );
    }

    #[gtest]
    fn test_write_fails_if_no_value_matches() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding("pll".to_string());
        // the device silently coerces every source to "pll"
        let result = tester.test_write(
            "Clock Source",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, _v: String| r.set("pll".to_string()),
            &["clkgen".to_string(), "target".to_string()],
        );

        expect_that!(result.success, eq(false));
        expect_that!(result.matched_count(), eq(0));
        expect_that!(result.value_written.len(), eq(2));
    }

    #[gtest]
    fn test_write_initial_read_fault() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(0u32);
        reg.fail_reads = true;
        let result = tester.test_write(
            "Samples",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, v| r.set(v),
            &[1000, 5000],
        );

        expect_that!(result.success, eq(false));
        expect_that!(result.test_type, eq(TestType::ReadWrite));
        expect_that!(result.value_written.is_empty(), eq(true));
        expect_that!(result.error_message.as_str(), contains_substring("unsupported"));
        expect_that!(reg.writes, eq(0));
    }

    #[gtest]
    fn test_write_restores_original() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(10u32);
        tester.test_write(
            "Ext_Offset",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, v| r.set(v),
            &[0, 50, 500],
        );

        expect_that!(reg.get(), ok(eq(&10)));
    }

    #[gtest]
    fn test_write_swallows_restore_fault() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(10u32);
        // the three test writes go through, the restoring fourth one faults
        reg.writes_before_failing = Some(3);
        let result = tester.test_write(
            "Ext_Offset",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, v| r.set(v),
            &[0, 50, 500],
        );

        expect_that!(result.success, eq(true));
        expect_that!(result.matched_count(), eq(3));
        expect_that!(tester.results().len(), eq(1));
        expect_that!(reg.value, eq(500));
    }

    #[gtest]
    fn test_write_without_restore() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(10u32);
        tester.test_write_with(
            "Ext_Offset",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, v| r.set(v),
            &[0, 50],
            false,
        );

        expect_that!(reg.value, eq(50));
        expect_that!(reg.writes, eq(2));
    }

    #[gtest]
    #[rstest]
    #[case::exact(24e6, 24.0e6, true)]
    #[case::too_far(24e6, 23.0e6, false)]
    #[case::near_zero(0.0, 0.005, true)]
    #[case::zero_too_far(0.0, 1.0, false)]
    fn test_write_float_tolerance(
        #[case] attempted: f64,
        #[case] readback: f64,
        #[case] expected: bool,
    ) {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(7.37e6);
        let result = tester.test_write(
            "Clock Frequency",
            "reg",
            &mut reg,
            |r| r.get(),
            |r, _v: f64| r.set(readback),
            &[attempted],
        );

        expect_that!(result.success, eq(expected));
    }

    #[gtest]
    fn test_method_records_args_and_value() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(0u32);
        let result = tester.test_method(
            "Bump",
            "reg.bump()",
            &mut reg,
            |r, (by, _label): (u32, &str)| r.set(by),
            (3, "lp"),
        );

        expect_that!(result.success, eq(true));
        expect_that!(result.value_read.is_none(), eq(true));
        expect_that!(result.notes.as_str(), eq("Called with args: (3, \"lp\")"));
        expect_that!(reg.value, eq(3));
    }

    #[gtest]
    fn test_method_absorbs_fault() {
        let mut tester = ParameterTester::new(false);
        let mut reg = Register::holding(0u32);
        reg.rejected = vec![7];
        let result = tester.test_method("Bump", "reg.bump()", &mut reg, |r, v| r.set(v), 7);

        expect_that!(result.success, eq(false));
        expect_that!(result.error_message.as_str(), contains_substring("out of range"));
    }

    #[gtest]
    fn test_results_keep_insertion_order() {
        let mut tester = ParameterTester::new(true);
        let mut reg = Register::holding(1u32);
        tester.test_read("first", "a", &mut reg, |r| r.get());
        tester.test_write("second", "b", &mut reg, |r| r.get(), |r, v| r.set(v), &[2]);
        tester.test_method("third", "c", &mut reg, |_, ()| Ok(()), ());

        let names: Vec<&str> = tester.results().iter().map(|r| r.parameter.as_str()).collect();
        expect_that!(names, eq(&vec!["first", "second", "third"]));
    }

    #[gtest]
    fn test_step_stops_after_interrupt() {
        let flag = Arc::new(AtomicBool::new(false));
        let tester = ParameterTester::with_interrupt(false, flag.clone());
        expect_that!(tester.step(1, 2, "first"), ok(anything()));

        flag.store(true, Ordering::SeqCst);
        expect_that!(
            tester.step(2, 2, "second"),
            err(displays_as(contains_substring("HuskyError::Interrupted")))
        );
    }
}
