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

//! Clock tree and lock status only found on the Husky.

use crate::backends::device::Scope;
use crate::error::HuskyError;
use crate::report::banner;
use crate::suites::strings;
use crate::tester::ParameterTester;

const STEPS: usize = 6;

/// Test the Husky clock tree. Does nothing on other scopes.
pub fn run(tester: &mut ParameterTester, scope: &mut dyn Scope) -> Result<(), HuskyError> {
    println!("{}", banner("HUSKY-SPECIFIC PARAMETERS"));

    let is_husky = scope.is_husky();
    println!("\nDevice is Husky: {is_husky}");
    if !is_husky {
        println!("Skipping Husky-specific tests...");
        return Ok(());
    }

    tester.step(1, STEPS, "Testing Clkgen Source...")?;
    tester.test_write(
        "Clkgen Source",
        "scope.clock.clkgen_src",
        scope,
        |s| s.clock().clkgen_src(),
        |s, v: String| s.clock().set_clkgen_src(&v),
        &strings(&["system", "extclk"]),
    );

    tester.step(2, STEPS, "Testing ADC Mul...")?;
    tester.test_write(
        "ADC Mul",
        "scope.clock.adc_mul",
        scope,
        |s| s.clock().adc_mul(),
        |s, v| s.clock().set_adc_mul(v),
        &[1, 2, 4],
    );

    tester.step(3, STEPS, "Testing PLL Lock Status...")?;
    tester.test_read("PLL Locked", "scope.clock.pll.pll_locked", scope, |s| {
        s.clock().pll().map(|pll| pll.pll_locked()).transpose()
    });

    tester.step(4, STEPS, "Testing Glitch MMCM Locked...")?;
    tester.test_read(
        "Glitch MMCM Locked",
        "scope.glitch.mmcm_locked",
        scope,
        |s| s.glitch().mmcm_locked(),
    );

    tester.step(5, STEPS, "Testing ADC Frequency...")?;
    tester.test_read(
        "ADC Frequency",
        "scope.clock.adc_freq",
        scope,
        |s| s.clock().adc_freq(),
    );

    tester.step(6, STEPS, "Testing Scope Info...")?;
    tester.test_read("Scope Name", "scope.getName()", scope, |s| s.name());

    Ok(())
}
