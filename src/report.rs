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

//! Text rendering of accumulated results.
//!
//! Both renderers are pure functions of the record slice and return the text instead of
//! printing it, so that the CLI decides where it goes.

use crate::config::{BANNER_WIDTH, TABLE_COLUMN_WIDTHS};
use crate::record::{TestResult, TestType};
use std::fmt::Write;

/// Pass/fail counts over a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_records(records: &[TestResult]) -> Self {
        let passed = records.iter().filter(|r| r.success).count();
        Summary {
            total: records.len(),
            passed,
            failed: records.len() - passed,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    fn percent_line(&self, label: &str, count: usize) -> String {
        if self.total == 0 {
            format!("{label}: 0")
        } else {
            let percent = 100.0 * count as f64 / self.total as f64;
            format!("{label}: {count} ({percent:.1}%)")
        }
    }
}

/// A section title between two `=` rules, preceded by a blank line.
pub fn banner(title: &str) -> String {
    let rule = "=".repeat(BANNER_WIDTH);
    format!("\n{rule}\n{title}\n{rule}")
}

/// Render the counts, then every failure with its error, then every success with its value.
pub fn render_summary(records: &[TestResult]) -> String {
    let summary = Summary::from_records(records);
    let mut out = banner("TEST SUMMARY");

    // writing into a String cannot fail
    let _ = writeln!(out, "\n\nTotal Tests: {}", summary.total);
    let _ = writeln!(out, "{}", summary.percent_line("Passed", summary.passed));
    let _ = writeln!(out, "{}", summary.percent_line("Failed", summary.failed));

    if summary.failed > 0 {
        out.push_str("\n--- FAILED TESTS ---\n");
        for r in records.iter().filter(|r| !r.success) {
            let _ = writeln!(out, "  {}", r.parameter);
            let _ = writeln!(out, "    API: {}", r.api_path);
            let _ = writeln!(out, "    Error: {}", r.error_message);
        }
    }

    out.push_str("\n--- PASSED TESTS ---\n");
    for r in records.iter().filter(|r| r.success) {
        let _ = match r.test_type {
            TestType::Read | TestType::Write => writeln!(out, "  {}: {}", r.parameter, r.value_read),
            TestType::ReadWrite => writeln!(out, "  {}: {} (original)", r.parameter, r.value_read),
            TestType::Method => writeln!(out, "  {}: OK", r.parameter),
        };
    }
    out
}

/// Render one markdown table row per record, with every column cut to a fixed width.
pub fn render_table(records: &[TestResult]) -> String {
    let [param_w, api_w, status_w, notes_w] = TABLE_COLUMN_WIDTHS;
    let mut out = banner("PARAMETER VERIFICATION TABLE");
    out.push_str("\n\n| Parameter | API Path | Status | Value/Notes |\n");
    out.push_str("|-----------|----------|--------|-------------|\n");

    for r in records {
        let status = if r.success { "[PASS]" } else { "[FAIL]" };
        let notes = if r.success {
            match r.test_type {
                TestType::Read | TestType::Write => r.value_read.to_string(),
                TestType::ReadWrite => format!("Original: {}", r.value_read),
                TestType::Method => "Method OK".to_owned(),
            }
        } else {
            r.error_message.clone()
        };
        let _ = writeln!(
            out,
            "| {:<param_w$} | {:<api_w$} | {:<status_w$} | {:<notes_w$} |",
            truncate(&r.parameter, param_w),
            truncate(&r.api_path, api_w),
            status,
            truncate(&notes, notes_w),
        );
    }
    out
}

/// The first `max_chars` characters of `s`.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::WriteAttempt;
    use crate::value::ParamValue;
    use googletest::prelude::*;
    use rstest::*;

    fn record(name: &str, test_type: TestType, success: bool) -> TestResult {
        if success {
            TestResult::passed(name, "scope.glitch.width", test_type, ParamValue::Int(4592))
        } else {
            TestResult::failed(name, "scope.glitch.width", test_type, "unsupported")
        }
    }

    #[gtest]
    #[rstest]
    #[case::empty(&[], 0, 0)]
    #[case::all_pass(&[true, true, true], 3, 0)]
    #[case::mixed(&[true, false, true, false], 2, 2)]
    fn test_summary_counts(
        #[case] outcomes: &[bool],
        #[case] passed: usize,
        #[case] failed: usize,
    ) {
        let records: Vec<TestResult> = outcomes
            .iter()
            .map(|&ok| record("Width", TestType::Read, ok))
            .collect();
        let summary = Summary::from_records(&records);

        expect_that!(summary.passed, eq(passed));
        expect_that!(summary.failed, eq(failed));
        expect_that!(summary.passed + summary.failed, eq(summary.total));
    }

    #[gtest]
    fn test_summary_empty_has_no_percentages() {
        let text = render_summary(&[]);
        expect_that!(text, contains_substring("Total Tests: 0"));
        expect_that!(text, contains_substring("Passed: 0\n"));
        expect_that!(text, not(contains_substring("FAILED TESTS")));
    }

    #[gtest]
    fn test_summary_lists_failures_and_values() {
        let mut write = record("Repeat", TestType::ReadWrite, true);
        write.value_written.push(WriteAttempt {
            attempted: ParamValue::Int(5),
            readback: Some(ParamValue::Int(5)),
            matched: true,
        });
        let records = vec![
            record("Phase Shift Steps", TestType::Read, true),
            write,
            record("Arm", TestType::Method, true),
            record("Broken", TestType::Read, false),
        ];
        let text = render_summary(&records);

        expect_that!(text, contains_substring("Passed: 3 (75.0%)"));
        expect_that!(text, contains_substring("Failed: 1 (25.0%)"));
        expect_that!(
            text,
            contains_substring("  Broken\n    API: scope.glitch.width\n    Error: unsupported")
        );
        expect_that!(text, contains_substring("  Phase Shift Steps: 4592\n"));
        expect_that!(text, contains_substring("  Repeat: 4592 (original)\n"));
        expect_that!(text, contains_substring("  Arm: OK\n"));
    }

    #[gtest]
    fn test_table_row_layout() {
        let records = vec![record("Width", TestType::ReadWrite, true)];
        let text = render_table(&records);
        let expected = format!(
            "| {:<25} | {:<30} | [PASS] | {:<30} |",
            "Width", "scope.glitch.width", "Original: 4592"
        );
        expect_that!(text, contains_substring(expected));
        expect_that!(
            text,
            contains_substring("| Parameter | API Path | Status | Value/Notes |")
        );
    }

    #[gtest]
    fn test_table_truncates_long_fields() {
        let r = TestResult::failed(
            "ADC Lo Gain Errors Disabled Really",
            "scope.adc.lo_gain_errors_disabled",
            TestType::ReadWrite,
            "HuskyError::Device: scope.adc.lo_gain_errors_disabled failed: injected fault",
        );
        let text = render_table(&[r]);

        expect_that!(
            text,
            contains_substring(
                "| ADC Lo Gain Errors Disabl | scope.adc.lo_gain_errors_disab | [FAIL] | HuskyError::Device: scope.adc. |"
            )
        );
    }

    #[gtest]
    fn test_table_empty_fields() {
        let r = TestResult::passed("", "", TestType::Method, ParamValue::None);
        let text = render_table(&[r]);
        let expected = format!("| {:<25} | {:<30} | [PASS] | {:<30} |", "", "", "Method OK");
        expect_that!(text, contains_substring(expected));
    }

    #[gtest]
    #[rstest]
    #[case::short("abc", 5, "abc")]
    #[case::exact("abcde", 5, "abcde")]
    #[case::long("abcdefgh", 5, "abcde")]
    #[case::multibyte("µµµµµµ", 3, "µµµ")]
    fn test_truncate(#[case] s: &str, #[case] max: usize, #[case] expected: &str) {
        expect_that!(truncate(s, max), eq(expected));
    }
}
