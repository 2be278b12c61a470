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

//! Clock glitch timing and output settings.

use crate::backends::device::Scope;
use crate::error::HuskyError;
use crate::report::banner;
use crate::suites::strings;
use crate::tester::ParameterTester;

const STEPS: usize = 12;

/// Enable the glitch module and test its clock glitch parameters.
///
/// # Returns: `Result<(), HuskyError>`
/// * `Ok(())` - All twelve checks ran
/// * `Err(HuskyError)` - The glitch module could not be enabled, or the run was interrupted
pub fn run(tester: &mut ParameterTester, scope: &mut dyn Scope) -> Result<(), HuskyError> {
    println!("{}", banner("CLOCK GLITCH PARAMETERS"));

    // the Husky rejects width and offset writes while the module is off
    tester.step(0, STEPS, "Enabling glitch module (required for width/offset)...")?;
    scope.glitch().set_enabled(true)?;
    scope.glitch().set_clk_src("pll")?;
    tester.log(format!("Glitch enabled: {}", scope.glitch().enabled()?));
    tester.log(format!("Glitch clk_src: {}", scope.glitch().clk_src()?));

    tester.step(1, STEPS, "Testing Width...")?;
    tester.test_write(
        "Width",
        "scope.glitch.width",
        scope,
        |s| s.glitch().width(),
        |s, v| s.glitch().set_width(v),
        &[0, 1000, 2000, 3000, 4592],
    );

    tester.step(2, STEPS, "Testing Offset...")?;
    tester.test_write(
        "Offset",
        "scope.glitch.offset",
        scope,
        |s| s.glitch().offset(),
        |s, v| s.glitch().set_offset(v),
        &[0, 1000, 2000, 3000, 4592],
    );

    tester.step(3, STEPS, "Testing Ext_Offset...")?;
    tester.test_write(
        "Ext_Offset",
        "scope.glitch.ext_offset",
        scope,
        |s| s.glitch().ext_offset(),
        |s, v| s.glitch().set_ext_offset(v),
        &[0, 10, 50, 100, 500],
    );

    tester.step(4, STEPS, "Testing Repeat...")?;
    tester.test_write(
        "Repeat",
        "scope.glitch.repeat",
        scope,
        |s| s.glitch().repeat(),
        |s, v| s.glitch().set_repeat(v),
        &[1, 5, 10, 50, 255],
    );

    // "clkgen" is silently turned into "pll" on the Husky, so only "pll" is meaningful
    tester.step(5, STEPS, "Testing Clock Source...")?;
    tester.test_write(
        "Clock Source",
        "scope.glitch.clk_src",
        scope,
        |s| s.glitch().clk_src(),
        |s, v: String| s.glitch().set_clk_src(&v),
        &strings(&["pll"]),
    );

    tester.step(6, STEPS, "Testing Output Mode...")?;
    tester.test_write(
        "Output Mode",
        "scope.glitch.output",
        scope,
        |s| s.glitch().output(),
        |s, v: String| s.glitch().set_output(&v),
        &strings(&["clock_xor", "clock_or", "glitch_only", "enable_only"]),
    );

    tester.step(7, STEPS, "Testing Trigger Source...")?;
    tester.test_write(
        "Trigger Source",
        "scope.glitch.trigger_src",
        scope,
        |s| s.glitch().trigger_src(),
        |s, v: String| s.glitch().set_trigger_src(&v),
        &strings(&["ext_single", "ext_continuous", "manual"]),
    );

    tester.step(8, STEPS, "Testing Clock Frequency...")?;
    tester.test_write(
        "Clock Frequency",
        "scope.clock.clkgen_freq",
        scope,
        |s| s.clock().clkgen_freq(),
        |s, v| s.clock().set_clkgen_freq(v),
        &[7.37e6, 24e6, 48e6, 100e6],
    );

    tester.step(9, STEPS, "Testing Phase Shift Steps (read-only)...")?;
    tester.test_read(
        "Phase Shift Steps",
        "scope.glitch.phase_shift_steps",
        scope,
        |s| s.glitch().phase_shift_steps(),
    );

    tester.step(10, STEPS, "Testing Glitch Enabled...")?;
    tester.test_write(
        "Glitch Enabled",
        "scope.glitch.enabled",
        scope,
        |s| s.glitch().enabled(),
        |s, v| s.glitch().set_enabled(v),
        &[true, false, true],
    );

    tester.step(11, STEPS, "Testing HS2 Output...")?;
    tester.test_write(
        "HS2 Output",
        "scope.io.hs2",
        scope,
        |s| s.io().hs2(),
        |s, v: String| s.io().set_hs2(&v),
        &strings(&["clkgen", "glitch"]),
    );

    tester.step(12, STEPS, "Testing Arm method...")?;
    tester.test_method("Arm", "scope.arm()", scope, |s, ()| s.arm(), ());

    Ok(())
}
