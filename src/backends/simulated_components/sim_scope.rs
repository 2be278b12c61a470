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

//! In-memory scope model.
//!
//! [`SimulatedScope`] keeps every attribute in memory and validates writes the way the
//! ChipWhisperer control library does, so that the checks see realistic failures:
//!
//! | Attribute                  | Husky                                 | Lite                        |
//! |----------------------------|---------------------------------------|-----------------------------|
//! | `glitch.clk_src`           | `target`, `pll` (`clkgen` -> `pll`)   | `target`, `clkgen`          |
//! | `glitch.width` / `offset`  | `0..=4592`, glitch module enabled     | `0..=255`                   |
//! | `glitch.phase_shift_steps` | 4592                                  | unsupported                 |
//! | `glitch.mmcm_locked`       | locked while enabled                  | none                        |
//! | `clock.clkgen_freq`        | 1 MHz..=300 MHz, 11.71875 kHz steps   | 3.2 MHz..=200 MHz, exact    |
//! | `clock.adc_mul`            | `1..=16`                              | unsupported                 |
//! | `clock.pll`                | present                               | none                        |
//! | `adc.samples`              | `1..=131070`                          | `1..=24400`                 |
//! | `adc.*_errors_disabled`    | supported                             | unsupported                 |
//! | `trigger.module`           | basic, SAD, edge_counter, UART, trace | basic                       |
//!
//! Any attribute can additionally be made to fail through a [`FaultSet`].

use crate::backends::device::{Adc, Clock, Glitch, Io, Pll, Scope, Trigger, VglitchMode};
use crate::backends::simulated_components::checks::{
    FaultSet, SharedFaults, check_choice, check_range,
};
use crate::error::HuskyError;
use log::{info, trace, warn};
use std::sync::Arc;

/// Which product the simulated scope behaves like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimModel {
    Husky,
    Lite,
}

impl SimModel {
    fn name(self) -> &'static str {
        match self {
            SimModel::Husky => "ChipWhisperer Husky",
            SimModel::Lite => "ChipWhisperer Lite",
        }
    }
}

/// Phase shift steps per clock period of the Husky glitch MMCM.
const HUSKY_PHASE_SHIFT_STEPS: u32 = 4592;
/// Frequency resolution of the Husky target clock PLL, in Hz.
const HUSKY_PLL_STEP_HZ: f64 = 12e6 / 1024.0;
/// Highest ADC clock at which the Husky sampling PLL stays locked, in Hz.
const HUSKY_MAX_ADC_FREQ: f64 = 200e6;
const DEFAULT_CLKGEN_FREQ: f64 = 7.37e6;

const GLITCH_OUTPUTS: &[&str] = &["clock_xor", "clock_or", "glitch_only", "enable_only"];
const GLITCH_TRIGGERS: &[&str] = &["ext_single", "ext_continuous", "manual", "continuous"];
const CLKGEN_SOURCES: &[&str] = &["system", "extclk"];
const HS2_FUNCTIONS: &[&str] = &["clkgen", "glitch", "disabled"];
const NRST_STATES: &[&str] = &["high_z", "low", "high", "disabled"];
const HUSKY_TRIGGER_MODULES: &[&str] = &["basic", "SAD", "edge_counter", "UART", "trace"];
const LITE_TRIGGER_MODULES: &[&str] = &["basic"];

/// A scope held entirely in memory.
///
/// # Fields
///
/// * `model` - Product whose behaviour is simulated
/// * `faults` - Paths that fail on access
/// * `connected` - Cleared by [`Scope::disconnect`]
#[derive(Debug)]
pub struct SimulatedScope {
    model: SimModel,
    faults: SharedFaults,
    connected: bool,
    glitch: SimGlitch,
    clock: SimClock,
    io: SimIo,
    adc: SimAdc,
    trigger: SimTrigger,
}

impl SimulatedScope {
    /// Create a scope in its power-on state.
    ///
    /// # Arguments
    ///
    /// * `model` - Product to simulate
    /// * `faults` - Paths that should fail on access
    pub fn new(model: SimModel, faults: FaultSet) -> Self {
        let faults = Arc::new(faults);
        SimulatedScope {
            model,
            connected: true,
            glitch: SimGlitch::new(model, faults.clone()),
            clock: SimClock::new(model, faults.clone()),
            io: SimIo::new(faults.clone()),
            adc: SimAdc::new(model, faults.clone()),
            trigger: SimTrigger::new(model, faults.clone()),
            faults,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn ensure_connected(&self) -> Result<(), HuskyError> {
        if !self.connected {
            return Err(HuskyError::device("scope", "not connected"));
        }
        Ok(())
    }
}

impl Scope for SimulatedScope {
    fn name(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.getName")?;
        Ok(self.model.name().to_owned())
    }

    fn is_husky(&self) -> bool {
        self.model == SimModel::Husky
    }

    fn default_setup(&mut self) -> Result<(), HuskyError> {
        self.ensure_connected()?;
        self.faults.check("scope.default_setup")?;
        info!("Applying default setup to simulated {}", self.model.name());
        self.glitch = SimGlitch::new(self.model, self.faults.clone());
        self.clock = SimClock::new(self.model, self.faults.clone());
        self.io = SimIo::new(self.faults.clone());
        self.adc = SimAdc::new(self.model, self.faults.clone());
        self.trigger = SimTrigger::new(self.model, self.faults.clone());
        Ok(())
    }

    fn arm(&mut self) -> Result<(), HuskyError> {
        self.ensure_connected()?;
        self.faults.check("scope.arm")?;
        self.adc.state = true;
        self.adc.trig_count = 0;
        trace!("armed");
        Ok(())
    }

    fn vglitch_setup(&mut self, mode: VglitchMode, default_setup: bool) -> Result<(), HuskyError> {
        self.ensure_connected()?;
        self.faults.check("scope.vglitch_setup")?;
        if default_setup {
            self.default_setup()?;
        }
        let glitch = &mut self.glitch;
        glitch.enabled = true;
        glitch.clk_src = match self.model {
            SimModel::Husky => "pll",
            SimModel::Lite => "clkgen",
        }
        .to_owned();
        glitch.output = "enable_only".to_owned();
        glitch.trigger_src = "ext_single".to_owned();
        glitch.repeat = 1;
        self.io.glitch_lp = matches!(mode, VglitchMode::Lp | VglitchMode::Both);
        self.io.glitch_hp = matches!(mode, VglitchMode::Hp | VglitchMode::Both);
        trace!("voltage glitching set up for {mode}");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), HuskyError> {
        self.ensure_connected()?;
        self.connected = false;
        info!("Disconnected simulated {}", self.model.name());
        Ok(())
    }

    fn glitch(&mut self) -> &mut dyn Glitch {
        &mut self.glitch
    }

    fn clock(&mut self) -> &mut dyn Clock {
        &mut self.clock
    }

    fn io(&mut self) -> &mut dyn Io {
        &mut self.io
    }

    fn adc(&mut self) -> &mut dyn Adc {
        &mut self.adc
    }

    fn trigger(&mut self) -> &mut dyn Trigger {
        &mut self.trigger
    }
}

#[derive(Debug)]
struct SimGlitch {
    model: SimModel,
    faults: SharedFaults,
    enabled: bool,
    clk_src: String,
    width: u32,
    offset: u32,
    ext_offset: u32,
    repeat: u32,
    output: String,
    trigger_src: String,
}

impl SimGlitch {
    fn new(model: SimModel, faults: SharedFaults) -> Self {
        SimGlitch {
            model,
            faults,
            enabled: false,
            clk_src: "target".to_owned(),
            width: 0,
            offset: 0,
            ext_offset: 0,
            repeat: 1,
            output: "clock_xor".to_owned(),
            trigger_src: "manual".to_owned(),
        }
    }

    fn max_phase_step(&self) -> u32 {
        match self.model {
            SimModel::Husky => HUSKY_PHASE_SHIFT_STEPS,
            SimModel::Lite => 255,
        }
    }

    /// The Husky glitch MMCMs only run while the module is enabled.
    fn check_phase_writable(&self, path: &str) -> Result<(), HuskyError> {
        if self.model == SimModel::Husky && !self.enabled {
            return Err(HuskyError::device(
                path,
                "glitch module is disabled, set scope.glitch.enabled first",
            ));
        }
        Ok(())
    }
}

impl Glitch for SimGlitch {
    fn enabled(&mut self) -> Result<bool, HuskyError> {
        self.faults.check("scope.glitch.enabled")?;
        Ok(self.enabled)
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), HuskyError> {
        self.faults.check("scope.glitch.enabled")?;
        self.enabled = enabled;
        Ok(())
    }

    fn clk_src(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.glitch.clk_src")?;
        Ok(self.clk_src.clone())
    }

    fn set_clk_src(&mut self, src: &str) -> Result<(), HuskyError> {
        let path = "scope.glitch.clk_src";
        self.faults.check(path)?;
        let src = match (self.model, src) {
            (SimModel::Husky, "clkgen") => {
                warn!("{path}: 'clkgen' is not available on Husky, using 'pll'");
                "pll"
            }
            (SimModel::Husky, s) => {
                check_choice(path, s, &["target", "pll"])?;
                s
            }
            (SimModel::Lite, s) => {
                check_choice(path, s, &["target", "clkgen"])?;
                s
            }
        };
        self.clk_src = src.to_owned();
        Ok(())
    }

    fn width(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("scope.glitch.width")?;
        Ok(self.width)
    }

    fn set_width(&mut self, width: u32) -> Result<(), HuskyError> {
        let path = "scope.glitch.width";
        self.faults.check(path)?;
        self.check_phase_writable(path)?;
        check_range(path, width, 0..=self.max_phase_step())?;
        self.width = width;
        Ok(())
    }

    fn offset(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("scope.glitch.offset")?;
        Ok(self.offset)
    }

    fn set_offset(&mut self, offset: u32) -> Result<(), HuskyError> {
        let path = "scope.glitch.offset";
        self.faults.check(path)?;
        self.check_phase_writable(path)?;
        check_range(path, offset, 0..=self.max_phase_step())?;
        self.offset = offset;
        Ok(())
    }

    fn ext_offset(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("scope.glitch.ext_offset")?;
        Ok(self.ext_offset)
    }

    fn set_ext_offset(&mut self, ext_offset: u32) -> Result<(), HuskyError> {
        self.faults.check("scope.glitch.ext_offset")?;
        self.ext_offset = ext_offset;
        Ok(())
    }

    fn repeat(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("scope.glitch.repeat")?;
        Ok(self.repeat)
    }

    fn set_repeat(&mut self, repeat: u32) -> Result<(), HuskyError> {
        let path = "scope.glitch.repeat";
        self.faults.check(path)?;
        check_range(path, repeat, 1..=255)?;
        self.repeat = repeat;
        Ok(())
    }

    fn output(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.glitch.output")?;
        Ok(self.output.clone())
    }

    fn set_output(&mut self, output: &str) -> Result<(), HuskyError> {
        let path = "scope.glitch.output";
        self.faults.check(path)?;
        check_choice(path, output, GLITCH_OUTPUTS)?;
        self.output = output.to_owned();
        Ok(())
    }

    fn trigger_src(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.glitch.trigger_src")?;
        Ok(self.trigger_src.clone())
    }

    fn set_trigger_src(&mut self, src: &str) -> Result<(), HuskyError> {
        let path = "scope.glitch.trigger_src";
        self.faults.check(path)?;
        check_choice(path, src, GLITCH_TRIGGERS)?;
        self.trigger_src = src.to_owned();
        Ok(())
    }

    fn phase_shift_steps(&mut self) -> Result<u32, HuskyError> {
        let path = "scope.glitch.phase_shift_steps";
        self.faults.check(path)?;
        match self.model {
            SimModel::Husky => Ok(HUSKY_PHASE_SHIFT_STEPS),
            SimModel::Lite => Err(HuskyError::Unsupported(path.to_owned())),
        }
    }

    fn mmcm_locked(&mut self) -> Result<Option<bool>, HuskyError> {
        self.faults.check("scope.glitch.mmcm_locked")?;
        Ok(match self.model {
            SimModel::Husky => Some(self.enabled),
            SimModel::Lite => None,
        })
    }
}

#[derive(Debug)]
struct SimClock {
    model: SimModel,
    faults: SharedFaults,
    clkgen_freq: f64,
    clkgen_src: String,
    adc_mul: u32,
    pll: SimPll,
}

impl SimClock {
    fn new(model: SimModel, faults: SharedFaults) -> Self {
        SimClock {
            model,
            pll: SimPll {
                faults: faults.clone(),
                locked: true,
            },
            faults,
            clkgen_freq: DEFAULT_CLKGEN_FREQ,
            clkgen_src: "system".to_owned(),
            adc_mul: 4,
        }
    }

    fn adc_freq_hz(&self) -> f64 {
        match self.model {
            SimModel::Husky => self.clkgen_freq * f64::from(self.adc_mul),
            SimModel::Lite => self.clkgen_freq * 4.0,
        }
    }
}

impl Clock for SimClock {
    fn clkgen_freq(&mut self) -> Result<f64, HuskyError> {
        self.faults.check("scope.clock.clkgen_freq")?;
        Ok(self.clkgen_freq)
    }

    fn set_clkgen_freq(&mut self, freq: f64) -> Result<(), HuskyError> {
        let path = "scope.clock.clkgen_freq";
        self.faults.check(path)?;
        self.clkgen_freq = match self.model {
            SimModel::Husky => {
                check_range(path, freq, 1e6..=300e6)?;
                (freq / HUSKY_PLL_STEP_HZ).round() * HUSKY_PLL_STEP_HZ
            }
            SimModel::Lite => {
                check_range(path, freq, 3.2e6..=200e6)?;
                freq
            }
        };
        trace!("{path}: asked for {freq} Hz, got {} Hz", self.clkgen_freq);
        Ok(())
    }

    fn clkgen_src(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.clock.clkgen_src")?;
        Ok(self.clkgen_src.clone())
    }

    fn set_clkgen_src(&mut self, src: &str) -> Result<(), HuskyError> {
        let path = "scope.clock.clkgen_src";
        self.faults.check(path)?;
        check_choice(path, src, CLKGEN_SOURCES)?;
        self.clkgen_src = src.to_owned();
        Ok(())
    }

    fn adc_mul(&mut self) -> Result<u32, HuskyError> {
        let path = "scope.clock.adc_mul";
        self.faults.check(path)?;
        match self.model {
            SimModel::Husky => Ok(self.adc_mul),
            SimModel::Lite => Err(HuskyError::Unsupported(path.to_owned())),
        }
    }

    fn set_adc_mul(&mut self, mul: u32) -> Result<(), HuskyError> {
        let path = "scope.clock.adc_mul";
        self.faults.check(path)?;
        if self.model == SimModel::Lite {
            return Err(HuskyError::Unsupported(path.to_owned()));
        }
        check_range(path, mul, 1..=16)?;
        self.adc_mul = mul;
        Ok(())
    }

    fn adc_freq(&mut self) -> Result<f64, HuskyError> {
        self.faults.check("scope.clock.adc_freq")?;
        Ok(self.adc_freq_hz())
    }

    fn pll(&mut self) -> Option<&mut dyn Pll> {
        match self.model {
            SimModel::Husky => {
                // no external clock is ever fed to the simulation
                self.pll.locked =
                    self.clkgen_src == "system" && self.adc_freq_hz() <= HUSKY_MAX_ADC_FREQ;
                Some(&mut self.pll)
            }
            SimModel::Lite => None,
        }
    }
}

#[derive(Debug)]
struct SimPll {
    faults: SharedFaults,
    locked: bool,
}

impl Pll for SimPll {
    fn pll_locked(&mut self) -> Result<bool, HuskyError> {
        self.faults.check("scope.clock.pll.pll_locked")?;
        Ok(self.locked)
    }
}

#[derive(Debug)]
struct SimIo {
    faults: SharedFaults,
    hs2: String,
    glitch_lp: bool,
    glitch_hp: bool,
    nrst: String,
}

impl SimIo {
    fn new(faults: SharedFaults) -> Self {
        SimIo {
            faults,
            hs2: "clkgen".to_owned(),
            glitch_lp: false,
            glitch_hp: false,
            nrst: "high_z".to_owned(),
        }
    }
}

impl Io for SimIo {
    fn hs2(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.io.hs2")?;
        Ok(self.hs2.clone())
    }

    fn set_hs2(&mut self, function: &str) -> Result<(), HuskyError> {
        let path = "scope.io.hs2";
        self.faults.check(path)?;
        check_choice(path, function, HS2_FUNCTIONS)?;
        self.hs2 = function.to_owned();
        Ok(())
    }

    fn glitch_lp(&mut self) -> Result<bool, HuskyError> {
        self.faults.check("scope.io.glitch_lp")?;
        Ok(self.glitch_lp)
    }

    fn set_glitch_lp(&mut self, enabled: bool) -> Result<(), HuskyError> {
        self.faults.check("scope.io.glitch_lp")?;
        self.glitch_lp = enabled;
        Ok(())
    }

    fn glitch_hp(&mut self) -> Result<bool, HuskyError> {
        self.faults.check("scope.io.glitch_hp")?;
        Ok(self.glitch_hp)
    }

    fn set_glitch_hp(&mut self, enabled: bool) -> Result<(), HuskyError> {
        self.faults.check("scope.io.glitch_hp")?;
        self.glitch_hp = enabled;
        Ok(())
    }

    fn nrst(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.io.nrst")?;
        Ok(self.nrst.clone())
    }

    fn set_nrst(&mut self, state: &str) -> Result<(), HuskyError> {
        let path = "scope.io.nrst";
        self.faults.check(path)?;
        check_choice(path, state, NRST_STATES)?;
        self.nrst = state.to_owned();
        Ok(())
    }

    fn vglitch_reset(&mut self) -> Result<(), HuskyError> {
        self.faults.check("scope.io.vglitch_reset")?;
        // the MOSFETs are cycled off and back to their previous state
        trace!(
            "vglitch reset, lp={} hp={} after cycling",
            self.glitch_lp, self.glitch_hp
        );
        Ok(())
    }
}

#[derive(Debug)]
struct SimAdc {
    model: SimModel,
    faults: SharedFaults,
    samples: u32,
    timeout: f64,
    trig_count: u32,
    state: bool,
    lo_gain_errors_disabled: bool,
    clip_errors_disabled: bool,
}

impl SimAdc {
    fn new(model: SimModel, faults: SharedFaults) -> Self {
        SimAdc {
            model,
            faults,
            samples: 5000,
            timeout: 2.0,
            trig_count: 0,
            state: false,
            lo_gain_errors_disabled: false,
            clip_errors_disabled: false,
        }
    }

    fn max_samples(&self) -> u32 {
        match self.model {
            SimModel::Husky => 131_070,
            SimModel::Lite => 24_400,
        }
    }

    fn husky_only(&self, path: &str) -> Result<(), HuskyError> {
        self.faults.check(path)?;
        match self.model {
            SimModel::Husky => Ok(()),
            SimModel::Lite => Err(HuskyError::Unsupported(path.to_owned())),
        }
    }
}

impl Adc for SimAdc {
    fn samples(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("scope.adc.samples")?;
        Ok(self.samples)
    }

    fn set_samples(&mut self, samples: u32) -> Result<(), HuskyError> {
        let path = "scope.adc.samples";
        self.faults.check(path)?;
        check_range(path, samples, 1..=self.max_samples())?;
        self.samples = samples;
        Ok(())
    }

    fn timeout(&mut self) -> Result<f64, HuskyError> {
        self.faults.check("scope.adc.timeout")?;
        Ok(self.timeout)
    }

    fn set_timeout(&mut self, timeout: f64) -> Result<(), HuskyError> {
        let path = "scope.adc.timeout";
        self.faults.check(path)?;
        if !(timeout.is_finite() && timeout > 0.0) {
            return Err(HuskyError::Argument(format!(
                "{timeout} is not a valid value for {path}, expected a positive number of seconds"
            )));
        }
        self.timeout = timeout;
        Ok(())
    }

    fn trig_count(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("scope.adc.trig_count")?;
        Ok(self.trig_count)
    }

    fn state(&mut self) -> Result<bool, HuskyError> {
        self.faults.check("scope.adc.state")?;
        Ok(self.state)
    }

    fn lo_gain_errors_disabled(&mut self) -> Result<bool, HuskyError> {
        self.husky_only("scope.adc.lo_gain_errors_disabled")?;
        Ok(self.lo_gain_errors_disabled)
    }

    fn set_lo_gain_errors_disabled(&mut self, disabled: bool) -> Result<(), HuskyError> {
        self.husky_only("scope.adc.lo_gain_errors_disabled")?;
        self.lo_gain_errors_disabled = disabled;
        Ok(())
    }

    fn clip_errors_disabled(&mut self) -> Result<bool, HuskyError> {
        self.husky_only("scope.adc.clip_errors_disabled")?;
        Ok(self.clip_errors_disabled)
    }

    fn set_clip_errors_disabled(&mut self, disabled: bool) -> Result<(), HuskyError> {
        self.husky_only("scope.adc.clip_errors_disabled")?;
        self.clip_errors_disabled = disabled;
        Ok(())
    }
}

#[derive(Debug)]
struct SimTrigger {
    model: SimModel,
    faults: SharedFaults,
    module: String,
}

impl SimTrigger {
    fn new(model: SimModel, faults: SharedFaults) -> Self {
        SimTrigger {
            model,
            faults,
            module: "basic".to_owned(),
        }
    }
}

impl Trigger for SimTrigger {
    fn module(&mut self) -> Result<String, HuskyError> {
        self.faults.check("scope.trigger.module")?;
        Ok(self.module.clone())
    }

    fn set_module(&mut self, module: &str) -> Result<(), HuskyError> {
        let path = "scope.trigger.module";
        self.faults.check(path)?;
        let allowed = match self.model {
            SimModel::Husky => HUSKY_TRIGGER_MODULES,
            SimModel::Lite => LITE_TRIGGER_MODULES,
        };
        check_choice(path, module, allowed)?;
        self.module = module.to_owned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    fn husky() -> SimulatedScope {
        SimulatedScope::new(SimModel::Husky, FaultSet::default())
    }

    fn lite() -> SimulatedScope {
        SimulatedScope::new(SimModel::Lite, FaultSet::default())
    }

    #[gtest]
    fn test_husky_width_needs_enabled_glitch() {
        let mut scope = husky();
        expect_that!(
            scope.glitch().set_width(1000),
            err(displays_as(contains_substring("glitch module is disabled")))
        );

        scope.glitch().set_enabled(true).unwrap();
        expect_that!(scope.glitch().set_width(1000), ok(anything()));
        expect_that!(scope.glitch().width(), ok(eq(&1000)));
        expect_that!(
            scope.glitch().set_offset(4593),
            err(displays_as(contains_substring("out of range")))
        );
    }

    #[gtest]
    #[rstest]
    #[case::husky_pll(SimModel::Husky, "pll", "pll")]
    #[case::husky_clkgen_converted(SimModel::Husky, "clkgen", "pll")]
    #[case::lite_clkgen(SimModel::Lite, "clkgen", "clkgen")]
    fn test_glitch_clk_src(#[case] model: SimModel, #[case] src: &str, #[case] expected: &str) {
        let mut scope = SimulatedScope::new(model, FaultSet::default());
        scope.glitch().set_clk_src(src).unwrap();
        expect_that!(scope.glitch().clk_src(), ok(eq(expected)));
    }

    #[gtest]
    fn test_lite_rejects_pll_glitch_source() {
        let mut scope = lite();
        expect_that!(
            scope.glitch().set_clk_src("pll"),
            err(displays_as(contains_substring("HuskyError::Argument")))
        );
    }

    #[gtest]
    #[rstest]
    #[case::slow(7.37e6)]
    #[case::exact(24e6)]
    #[case::fast(100e6)]
    fn test_husky_clkgen_freq_quantised_within_tolerance(#[case] freq: f64) {
        let mut scope = husky();
        scope.clock().set_clkgen_freq(freq).unwrap();
        let actual = scope.clock().clkgen_freq().unwrap();
        expect_that!((actual - freq).abs() < 0.01 * freq, eq(true), "got {actual}");
    }

    #[gtest]
    fn test_husky_clkgen_freq_out_of_range() {
        let mut scope = husky();
        expect_that!(scope.clock().set_clkgen_freq(500e6).is_err(), eq(true));
        expect_that!(scope.clock().clkgen_freq(), ok(eq(&DEFAULT_CLKGEN_FREQ)));
    }

    #[gtest]
    fn test_pll_unlocks_on_fast_adc_clock() {
        let mut scope = husky();
        let locked = scope.clock().pll().map(|pll| pll.pll_locked());
        expect_that!(locked.is_some_and(|l| l.is_ok_and(|l| l)), eq(true));

        scope.clock().set_clkgen_freq(100e6).unwrap();
        let locked = scope.clock().pll().map(|pll| pll.pll_locked());
        expect_that!(locked.is_some_and(|l| l.is_ok_and(|l| !l)), eq(true));
    }

    #[gtest]
    fn test_lite_capabilities_absent() {
        let mut scope = lite();
        expect_that!(scope.is_husky(), eq(false));
        expect_that!(scope.clock().pll().is_none(), eq(true));
        expect_that!(scope.glitch().mmcm_locked().is_ok_and(|l| l.is_none()), eq(true));
        expect_that!(
            scope.clock().adc_mul(),
            err(displays_as(contains_substring("HuskyError::Unsupported")))
        );
        expect_that!(scope.adc().set_samples(50_000).is_err(), eq(true));
    }

    #[gtest]
    fn test_arm_sets_adc_state() {
        let mut scope = husky();
        expect_that!(scope.adc().state(), ok(eq(&false)));
        scope.arm().unwrap();
        expect_that!(scope.adc().state(), ok(eq(&true)));
    }

    #[gtest]
    #[rstest]
    #[case::lp(VglitchMode::Lp, true, false)]
    #[case::hp(VglitchMode::Hp, false, true)]
    #[case::both(VglitchMode::Both, true, true)]
    fn test_vglitch_setup(#[case] mode: VglitchMode, #[case] lp: bool, #[case] hp: bool) {
        let mut scope = husky();
        scope.vglitch_setup(mode, false).unwrap();

        expect_that!(scope.glitch().enabled(), ok(eq(&true)));
        expect_that!(scope.glitch().output(), ok(eq("enable_only")));
        expect_that!(scope.io().glitch_lp(), ok(eq(&lp)));
        expect_that!(scope.io().glitch_hp(), ok(eq(&hp)));
    }

    #[gtest]
    fn test_default_setup_resets_state() {
        let mut scope = husky();
        scope.adc().set_samples(24_000).unwrap();
        scope.glitch().set_enabled(true).unwrap();
        scope.default_setup().unwrap();

        expect_that!(scope.adc().samples(), ok(eq(&5000)));
        expect_that!(scope.glitch().enabled(), ok(eq(&false)));
    }

    #[gtest]
    fn test_injected_fault() {
        let mut scope =
            SimulatedScope::new(SimModel::Husky, FaultSet::parse("scope.adc.trig_count"));
        expect_that!(
            scope.adc().trig_count(),
            err(displays_as(contains_substring("scope.adc.trig_count failed")))
        );
        expect_that!(scope.adc().state(), ok(anything()));
    }

    #[gtest]
    fn test_disconnect_twice_fails() {
        let mut scope = husky();
        expect_that!(scope.disconnect(), ok(anything()));
        expect_that!(scope.is_connected(), eq(false));
        expect_that!(scope.disconnect().is_err(), eq(true));
    }
}
