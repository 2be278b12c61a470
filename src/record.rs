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

//! Records describing the outcome of a single parameter test.

use crate::value::ParamValue;
use std::fmt;

/// The kind of access a [`TestResult`] exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    Read,
    Write,
    ReadWrite,
    Method,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestType::Read => "read",
            TestType::Write => "write",
            TestType::ReadWrite => "read_write",
            TestType::Method => "method",
        };
        write!(f, "{s}")
    }
}

/// One value tried during a read/write test.
///
/// `readback` is `None` when either the write or the following read faulted, in which
/// case `matched` is always `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteAttempt {
    pub attempted: ParamValue,
    pub readback: Option<ParamValue>,
    pub matched: bool,
}

/// The outcome of testing one parameter.
///
/// Built once by the [`ParameterTester`](crate::tester::ParameterTester) and never changed
/// afterwards; the tester only hands out shared references to its records.
///
/// # Fields
///
/// * `parameter` - Human readable name, e.g. "Width"
/// * `api_path` - Dotted access path, e.g. "scope.glitch.width"
/// * `test_type` - The kind of access exercised
/// * `success` - Whether the parameter behaved
/// * `value_read` - The value read, the original value for read/write tests, or the
///   method's return value
/// * `value_written` - Per-value detail of read/write tests, in the order tried
/// * `error_message` - Description of the fault when `success` is false
/// * `notes` - Free text annotation
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    pub parameter: String,
    pub api_path: String,
    pub test_type: TestType,
    pub success: bool,
    pub value_read: ParamValue,
    pub value_written: Vec<WriteAttempt>,
    pub error_message: String,
    pub notes: String,
}

impl TestResult {
    pub(crate) fn passed(
        parameter: &str,
        api_path: &str,
        test_type: TestType,
        value_read: ParamValue,
    ) -> Self {
        TestResult {
            parameter: parameter.to_owned(),
            api_path: api_path.to_owned(),
            test_type,
            success: true,
            value_read,
            value_written: Vec::new(),
            error_message: String::new(),
            notes: String::new(),
        }
    }

    pub(crate) fn failed(
        parameter: &str,
        api_path: &str,
        test_type: TestType,
        error_message: impl Into<String>,
    ) -> Self {
        TestResult {
            parameter: parameter.to_owned(),
            api_path: api_path.to_owned(),
            test_type,
            success: false,
            value_read: ParamValue::None,
            value_written: Vec::new(),
            error_message: error_message.into(),
            notes: String::new(),
        }
    }

    pub(crate) fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Number of tried values whose readback confirmed the write.
    pub fn matched_count(&self) -> usize {
        self.value_written.iter().filter(|a| a.matched).count()
    }
}
