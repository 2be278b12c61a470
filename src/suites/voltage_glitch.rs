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

//! Voltage glitch MOSFETs and setup helpers.
//!
//! Width, offset, ext_offset, repeat and trigger source drive voltage glitches through the
//! same registers as clock glitches, so they are only listed here, not tested again.

use crate::backends::device::{Scope, VglitchMode};
use crate::error::HuskyError;
use crate::report::banner;
use crate::suites::strings;
use crate::tester::ParameterTester;

const STEPS: usize = 10;

const SHARED_WITH_CLOCK_GLITCH: [&str; 5] =
    ["Width", "Offset", "Ext_Offset", "Repeat", "Trigger Source"];

pub fn run(tester: &mut ParameterTester, scope: &mut dyn Scope) -> Result<(), HuskyError> {
    println!("{}", banner("VOLTAGE GLITCH PARAMETERS"));

    tester.step(1, STEPS, "Testing vglitch_setup method...")?;
    for mode in [VglitchMode::Lp, VglitchMode::Hp, VglitchMode::Both] {
        // leave default_setup off so the rest of the configuration survives
        tester.test_method(
            &format!("vglitch_setup ({mode})"),
            &format!("scope.vglitch_setup('{mode}')"),
            scope,
            |s, (mode, default_setup)| s.vglitch_setup(mode, default_setup),
            (mode, false),
        );
    }

    tester.step(2, STEPS, "Testing LP MOSFET...")?;
    tester.test_write(
        "LP MOSFET",
        "scope.io.glitch_lp",
        scope,
        |s| s.io().glitch_lp(),
        |s, v| s.io().set_glitch_lp(v),
        &[true, false, true],
    );

    tester.step(3, STEPS, "Testing HP MOSFET...")?;
    tester.test_write(
        "HP MOSFET",
        "scope.io.glitch_hp",
        scope,
        |s| s.io().glitch_hp(),
        |s, v| s.io().set_glitch_hp(v),
        &[true, false, true],
    );

    tester.step(4, STEPS, "Testing Output Mode (voltage)...")?;
    tester.test_write(
        "Output Mode (Voltage)",
        "scope.glitch.output",
        scope,
        |s| s.glitch().output(),
        |s, v: String| s.glitch().set_output(&v),
        &strings(&["glitch_only", "enable_only"]),
    );

    tester.step(5, STEPS, "Testing vglitch_reset method...")?;
    tester.test_method(
        "vglitch_reset",
        "scope.io.vglitch_reset()",
        scope,
        |s, ()| s.io().vglitch_reset(),
        (),
    );

    for (index, name) in SHARED_WITH_CLOCK_GLITCH.iter().enumerate() {
        tester.step(
            index + 6,
            STEPS,
            &format!("{name} - Same as clock glitch (already tested)"),
        )?;
    }

    Ok(())
}
