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

//! Values read from or written to a device parameter.
//!
//! The device interfaces are strongly typed, but a [`TestResult`](crate::record::TestResult)
//! needs to hold whatever a parameter produced. [`ParamValue`] is that common currency, and
//! [`ParamValue::matches`] decides whether a readback confirms a write.

use crate::config::{FLOAT_NEAR_ZERO, FLOAT_RELATIVE_TOLERANCE};
use std::fmt;

/// A parameter value of any of the kinds a scope or target exposes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// The parameter produced nothing, e.g. a method without a return value or a
    /// capability the device does not have.
    #[default]
    None,
}

impl ParamValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Decide whether `readback` confirms that `self` was written.
    ///
    /// Floats match within a 1% relative tolerance, or within an absolute `0.01` when the
    /// written value is zero. Every other kind has to be equal, with integers and floats of
    /// the same numeric value considered equal.
    ///
    /// # Arguments
    ///
    /// * `readback` - The value read back after writing `self`
    ///
    /// # Returns: `bool`
    /// * `true` - The readback confirms the write
    /// * `false` - The readback differs or is of an incomparable kind
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use huskyprobe::value::ParamValue;
    /// assert!(ParamValue::Float(24e6).matches(&ParamValue::Float(24.0e6)));
    /// assert!(!ParamValue::Float(24e6).matches(&ParamValue::Float(23.0e6)));
    /// assert!(ParamValue::Int(1000).matches(&ParamValue::Int(1000)));
    /// ```
    pub fn matches(&self, readback: &ParamValue) -> bool {
        match (self, readback) {
            (ParamValue::Float(attempted), _) => match readback.as_f64() {
                Some(actual) if *attempted == 0.0 => actual.abs() < FLOAT_NEAR_ZERO,
                Some(actual) => {
                    (actual - attempted).abs() < FLOAT_RELATIVE_TOLERANCE * attempted.abs()
                }
                None => false,
            },
            (ParamValue::Int(attempted), ParamValue::Float(actual)) => *attempted as f64 == *actual,
            (attempted, actual) => attempted == actual,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::None)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            // Debug keeps the trailing `.0` so floats stay recognisable in reports
            ParamValue::Float(v) => write!(f, "{v:?}"),
            ParamValue::Str(s) => write!(f, "{s}"),
            ParamValue::None => write!(f, "none"),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_owned())
    }
}

impl From<()> for ParamValue {
    fn from(_: ()) -> Self {
        ParamValue::None
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::same_frequency(ParamValue::Float(24e6), ParamValue::Float(24.0e6), true)]
    #[case::quantised_frequency(ParamValue::Float(7.37e6), ParamValue::Float(7.3828125e6), true)]
    #[case::outside_tolerance(ParamValue::Float(24e6), ParamValue::Float(23.0e6), false)]
    #[case::near_zero(ParamValue::Float(0.0), ParamValue::Float(0.005), true)]
    #[case::zero_too_far(ParamValue::Float(0.0), ParamValue::Float(1.0), false)]
    #[case::float_against_int(ParamValue::Float(2.0), ParamValue::Int(2), true)]
    #[case::float_against_string(ParamValue::Float(2.0), ParamValue::Str("2.0".into()), false)]
    #[case::float_against_none(ParamValue::Float(0.0), ParamValue::None, false)]
    #[case::int_exact(ParamValue::Int(1000), ParamValue::Int(1000), true)]
    #[case::int_off_by_one(ParamValue::Int(4592), ParamValue::Int(4591), false)]
    #[case::int_against_whole_float(ParamValue::Int(5), ParamValue::Float(5.0), true)]
    #[case::bool_exact(ParamValue::Bool(true), ParamValue::Bool(true), true)]
    #[case::bool_is_not_int(ParamValue::Bool(true), ParamValue::Int(1), false)]
    #[case::string_exact(ParamValue::Str("pll".into()), ParamValue::Str("pll".into()), true)]
    #[case::string_differs(ParamValue::Str("clkgen".into()), ParamValue::Str("pll".into()), false)]
    fn test_matches(
        #[case] attempted: ParamValue,
        #[case] readback: ParamValue,
        #[case] expected: bool,
    ) {
        expect_that!(attempted.matches(&readback), eq(expected));
    }

    #[gtest]
    #[rstest]
    #[case::bool(ParamValue::Bool(false), "false")]
    #[case::int(ParamValue::Int(-3), "-3")]
    #[case::whole_float(ParamValue::Float(24e6), "24000000.0")]
    #[case::fractional_float(ParamValue::Float(0.5), "0.5")]
    #[case::string(ParamValue::Str("clock_xor".into()), "clock_xor")]
    #[case::none(ParamValue::None, "none")]
    fn test_display(#[case] value: ParamValue, #[case] expected: &str) {
        expect_that!(value.to_string(), eq(expected));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(ParamValue::from(Some(true)), ParamValue::Bool(true));
        assert_eq!(ParamValue::from(None::<bool>), ParamValue::None);
        assert!(ParamValue::from(()).is_none());
    }
}
