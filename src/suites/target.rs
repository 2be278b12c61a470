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

//! Serial settings of the target board.

use crate::backends::device::Target;
use crate::error::HuskyError;
use crate::report::banner;
use crate::tester::ParameterTester;

const STEPS: usize = 2;

/// Test the target, or print a skip notice and record nothing when there is none.
pub fn run(tester: &mut ParameterTester, target: Option<&mut dyn Target>) -> Result<(), HuskyError> {
    let Some(target) = target else {
        println!("{}", banner("TARGET PARAMETERS (SKIPPED - no target connected)"));
        return Ok(());
    };
    println!("{}", banner("TARGET PARAMETERS"));

    tester.step(1, STEPS, "Testing Baud Rate...")?;
    tester.test_write(
        "Baud Rate",
        "target.baud",
        target,
        |t| t.baud(),
        |t, v| t.set_baud(v),
        &[38400, 115200, 230400],
    );

    tester.step(2, STEPS, "Testing In Waiting (read-only)...")?;
    tester.test_read("In Waiting", "target.in_waiting()", target, |t| {
        t.in_waiting()
    });

    Ok(())
}
