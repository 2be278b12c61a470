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

//! Fault injection and argument validation shared by the simulated devices.

use crate::config::SIM_FAULTS_ENV;
use crate::error::HuskyError;
use log::{debug, trace};
use std::collections::HashSet;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Set of API paths on which a simulated device fails every access.
///
/// Paths are the same dotted strings the checks record, e.g. `scope.glitch.width` or
/// `target.in_waiting()`. The special paths `scope` and `target` fail the connection itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultSet {
    paths: HashSet<String>,
}

impl FaultSet {
    /// Parse a comma separated list of paths, ignoring blanks and surrounding whitespace.
    pub fn parse(list: &str) -> Self {
        let paths = list
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect();
        FaultSet { paths }
    }

    /// Read the fault list from the environment, see [`SIM_FAULTS_ENV`].
    pub fn from_env() -> Self {
        match std::env::var(SIM_FAULTS_ENV) {
            Ok(list) => {
                let faults = FaultSet::parse(&list);
                debug!("Injecting simulated faults on {:?}", faults.paths);
                faults
            }
            Err(_) => FaultSet::default(),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Fail with a [`HuskyError::Device`] if `path` is in the set.
    pub fn check(&self, path: &str) -> Result<(), HuskyError> {
        trace!("accessing {path}");
        if self.contains(path) {
            return Err(HuskyError::device(path, "injected fault"));
        }
        Ok(())
    }
}

/// Faults are shared by every namespace of a device.
pub type SharedFaults = Arc<FaultSet>;

/// Check that `value` is one of `allowed`.
///
/// # Returns: `Result<(), HuskyError>`
/// * `Ok(())` - The value is allowed
/// * `Err(HuskyError::Argument)` - The value is not in `allowed`
pub fn check_choice(path: &str, value: &str, allowed: &[&str]) -> Result<(), HuskyError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(HuskyError::Argument(format!(
            "{value:?} is not a valid value for {path}, expected one of {allowed:?}"
        )))
    }
}

/// Check that `value` lies within `range`.
///
/// # Returns: `Result<(), HuskyError>`
/// * `Ok(())` - The value is in range
/// * `Err(HuskyError::Argument)` - The value is out of range
pub fn check_range<T>(path: &str, value: T, range: RangeInclusive<T>) -> Result<(), HuskyError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(HuskyError::Argument(format!(
            "{value} is out of range for {path}, expected {}..={}",
            range.start(),
            range.end()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::single("scope.glitch.width", &["scope.glitch.width"])]
    #[case::several(" scope.adc.state , target.baud", &["scope.adc.state", "target.baud"])]
    #[case::blanks(",,scope,", &["scope"])]
    fn test_parse(#[case] list: &str, #[case] expected: &[&str]) {
        let faults = FaultSet::parse(list);
        for path in expected {
            expect_that!(faults.contains(path), eq(true), "missing {path}");
        }
        expect_that!(faults.paths.len(), eq(expected.len()));
    }

    #[gtest]
    fn test_parse_empty() {
        expect_that!(FaultSet::parse("").is_empty(), eq(true));
    }

    #[gtest]
    fn test_check_reports_path() {
        let faults = FaultSet::parse("scope.arm");
        expect_that!(
            faults.check("scope.arm"),
            err(displays_as(contains_substring("scope.arm failed: injected fault")))
        );
        expect_that!(faults.check("scope.glitch.width"), ok(anything()));
    }

    #[gtest]
    #[rstest]
    #[case::low(0u32, false)]
    #[case::start(1u32, true)]
    #[case::end(255u32, true)]
    #[case::high(256u32, false)]
    fn test_check_range(#[case] value: u32, #[case] ok_expected: bool) {
        expect_that!(
            check_range("scope.glitch.repeat", value, 1..=255).is_ok(),
            eq(ok_expected)
        );
    }

    #[gtest]
    fn test_check_choice() {
        let allowed = ["clock_xor", "clock_or"];
        expect_that!(check_choice("out", "clock_or", &allowed), ok(anything()));
        expect_that!(
            check_choice("out", "pulse", &allowed),
            err(displays_as(contains_substring("\"pulse\" is not a valid value for out")))
        );
    }
}
