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

//! Fixed checklists of parameters, one module per subsystem.
//!
//! The suites must run in the order of [`run_all`]: the clock glitch suite enables the
//! glitch module, which the Husky needs before glitch width and offset can be written,
//! and later suites rely on the scope being left in that state.
//!
//! A suite returns an error only when something outside the three test primitives fails,
//! such as a precondition it sets up itself or an interrupt at a step boundary. Faults on
//! the tested parameters themselves are recorded by the
//! [`ParameterTester`](crate::tester::ParameterTester) instead.

pub mod clock_glitch;
pub mod husky_specific;
pub mod shared;
pub mod target;
pub mod voltage_glitch;

use crate::backends::device::{Scope, Target};
use crate::error::HuskyError;
use crate::tester::ParameterTester;
use log::info;

/// Run every suite in order against `scope` and, if connected, `target`.
///
/// # Arguments
///
/// * `tester` - Collects the results
/// * `scope` - The capture device under test
/// * `target` - The target board, or `None` to skip the target suite
///
/// # Returns: `Result<(), HuskyError>`
/// * `Ok(())` - Every suite ran to the end
/// * `Err(HuskyError)` - A suite was aborted; results recorded so far stay in `tester`
pub fn run_all(
    tester: &mut ParameterTester,
    scope: &mut dyn Scope,
    target: Option<&mut dyn Target>,
) -> Result<(), HuskyError> {
    info!("Running clock glitch suite");
    clock_glitch::run(tester, scope)?;
    info!("Running voltage glitch suite");
    voltage_glitch::run(tester, scope)?;
    info!("Running shared configuration suite");
    shared::run(tester, scope)?;
    info!("Running target suite");
    target::run(tester, target)?;
    info!("Running Husky-specific suite");
    husky_specific::run(tester, scope)?;
    Ok(())
}

/// Owned copies of discrete setting values, as the string getters return `String`.
pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
