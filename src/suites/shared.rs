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

//! ADC, trigger and reset settings used by both glitch types.

use crate::backends::device::Scope;
use crate::error::HuskyError;
use crate::report::banner;
use crate::suites::strings;
use crate::tester::ParameterTester;

const STEPS: usize = 8;

pub fn run(tester: &mut ParameterTester, scope: &mut dyn Scope) -> Result<(), HuskyError> {
    println!("{}", banner("SHARED CONFIGURATION PARAMETERS"));

    tester.step(1, STEPS, "Testing ADC Samples...")?;
    tester.test_write(
        "ADC Samples",
        "scope.adc.samples",
        scope,
        |s| s.adc().samples(),
        |s, v| s.adc().set_samples(v),
        &[1000, 5000, 24000, 50000],
    );

    tester.step(2, STEPS, "Testing ADC Timeout...")?;
    tester.test_write(
        "ADC Timeout",
        "scope.adc.timeout",
        scope,
        |s| s.adc().timeout(),
        |s, v| s.adc().set_timeout(v),
        &[0.5, 1.0, 2.0, 5.0],
    );

    tester.step(3, STEPS, "Testing Trigger Module...")?;
    tester.test_write(
        "Trigger Module",
        "scope.trigger.module",
        scope,
        |s| s.trigger().module(),
        |s, v: String| s.trigger().set_module(&v),
        &strings(&["basic"]),
    );

    tester.step(4, STEPS, "Testing Target Reset...")?;
    tester.test_write(
        "Target Reset",
        "scope.io.nrst",
        scope,
        |s| s.io().nrst(),
        |s, v: String| s.io().set_nrst(&v),
        &strings(&["high_z", "low", "high_z"]),
    );

    tester.step(5, STEPS, "Testing ADC Trig Count (read-only)...")?;
    tester.test_read(
        "ADC Trig Count",
        "scope.adc.trig_count",
        scope,
        |s| s.adc().trig_count(),
    );

    tester.step(6, STEPS, "Testing ADC State (read-only)...")?;
    tester.test_read("ADC State", "scope.adc.state", scope, |s| s.adc().state());

    tester.step(7, STEPS, "Testing ADC Lo Gain Errors Disabled...")?;
    tester.test_write(
        "ADC Lo Gain Errors Disabled",
        "scope.adc.lo_gain_errors_disabled",
        scope,
        |s| s.adc().lo_gain_errors_disabled(),
        |s, v| s.adc().set_lo_gain_errors_disabled(v),
        &[true, false, true],
    );

    tester.step(8, STEPS, "Testing ADC Clip Errors Disabled...")?;
    tester.test_write(
        "ADC Clip Errors Disabled",
        "scope.adc.clip_errors_disabled",
        scope,
        |s| s.adc().clip_errors_disabled(),
        |s, v| s.adc().set_clip_errors_disabled(v),
        &[true, false, true],
    );

    Ok(())
}
