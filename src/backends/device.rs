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

//! Capability interfaces of the capture device and the device under test.
//!
//! The ChipWhisperer control library exposes a scope object with nested namespaces
//! (`glitch`, `clock`, `io`, `adc`, `trigger`) and a target object. Each namespace is a trait
//! here, declaring only the attributes and methods the checks in [`suites`](crate::suites)
//! actually call. A backend provides the implementations; tests provide mocks.
//!
//! Every getter takes `&mut self`, since reading a register on real hardware is a USB
//! transaction. Every fallible call returns [`HuskyError`], which the
//! [`ParameterTester`](crate::tester::ParameterTester) records rather than propagates.
//!
//! # Examples
//!
//! ```rust,no_run
//! # use huskyprobe::backends::device::Scope;
//! # fn example(scope: &mut dyn Scope) -> Result<(), huskyprobe::error::HuskyError> {
//! scope.glitch().set_enabled(true)?;
//! scope.glitch().set_width(1000)?;
//! let locked = scope.clock().pll().map(|pll| pll.pll_locked()).transpose()?;
//! println!("PLL locked: {locked:?}");
//! # Ok(())
//! # }
//! ```

use crate::error::HuskyError;
use std::fmt;

/// Power stage used for voltage glitching.
///
/// `Display` gives the bare mode string (`lp`), `Debug` the quoted literal (`'lp'`) as it
/// appears in an API call.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum VglitchMode {
    /// Low power MOSFET only.
    Lp,
    /// High power MOSFET only.
    Hp,
    /// Both MOSFETs.
    Both,
}

impl fmt::Display for VglitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VglitchMode::Lp => "lp",
            VglitchMode::Hp => "hp",
            VglitchMode::Both => "both",
        };
        write!(f, "{s}")
    }
}

impl fmt::Debug for VglitchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{self}'")
    }
}

/// The capture device.
pub trait Scope: Send {
    /// Get the product name of the scope, e.g. "ChipWhisperer Husky".
    fn name(&mut self) -> Result<String, HuskyError>;

    /// Whether the connected scope is a Husky. Husky-only checks are skipped otherwise.
    fn is_husky(&self) -> bool;

    /// Restore the scope's default capture configuration.
    fn default_setup(&mut self) -> Result<(), HuskyError>;

    /// Arm the ADC so that the next trigger starts a capture.
    fn arm(&mut self) -> Result<(), HuskyError>;

    /// Configure the glitch module for voltage glitching through the given MOSFETs.
    ///
    /// # Arguments
    ///
    /// * `mode` - Which power stage to drive
    /// * `default_setup` - Also reset the rest of the scope to its defaults first
    fn vglitch_setup(&mut self, mode: VglitchMode, default_setup: bool) -> Result<(), HuskyError>;

    /// Release the connection. Further calls are invalid.
    fn disconnect(&mut self) -> Result<(), HuskyError>;

    fn glitch(&mut self) -> &mut dyn Glitch;
    fn clock(&mut self) -> &mut dyn Clock;
    fn io(&mut self) -> &mut dyn Io;
    fn adc(&mut self) -> &mut dyn Adc;
    fn trigger(&mut self) -> &mut dyn Trigger;
}

/// Glitch generation module, shared by clock and voltage glitching.
pub trait Glitch {
    fn enabled(&mut self) -> Result<bool, HuskyError>;
    fn set_enabled(&mut self, enabled: bool) -> Result<(), HuskyError>;

    /// Clock feeding the glitch module, e.g. "pll" or "target".
    fn clk_src(&mut self) -> Result<String, HuskyError>;
    fn set_clk_src(&mut self, src: &str) -> Result<(), HuskyError>;

    /// Glitch width in phase shift steps.
    fn width(&mut self) -> Result<u32, HuskyError>;
    fn set_width(&mut self, width: u32) -> Result<(), HuskyError>;

    /// Glitch offset in phase shift steps.
    fn offset(&mut self) -> Result<u32, HuskyError>;
    fn set_offset(&mut self, offset: u32) -> Result<(), HuskyError>;

    /// Clock cycles between the trigger and the first glitch.
    fn ext_offset(&mut self) -> Result<u32, HuskyError>;
    fn set_ext_offset(&mut self, ext_offset: u32) -> Result<(), HuskyError>;

    /// Number of consecutive glitched cycles.
    fn repeat(&mut self) -> Result<u32, HuskyError>;
    fn set_repeat(&mut self, repeat: u32) -> Result<(), HuskyError>;

    /// How the glitch is combined with the clock, e.g. "clock_xor".
    fn output(&mut self) -> Result<String, HuskyError>;
    fn set_output(&mut self, output: &str) -> Result<(), HuskyError>;

    /// What fires the glitch, e.g. "ext_single".
    fn trigger_src(&mut self) -> Result<String, HuskyError>;
    fn set_trigger_src(&mut self, src: &str) -> Result<(), HuskyError>;

    /// Number of phase shift steps in one clock period.
    fn phase_shift_steps(&mut self) -> Result<u32, HuskyError>;

    /// Lock status of the glitch MMCM, or `None` on scopes without one.
    fn mmcm_locked(&mut self) -> Result<Option<bool>, HuskyError> {
        Ok(None)
    }
}

/// Clock generation for the target and the ADC.
pub trait Clock {
    /// Target clock frequency in Hz.
    fn clkgen_freq(&mut self) -> Result<f64, HuskyError>;
    fn set_clkgen_freq(&mut self, freq: f64) -> Result<(), HuskyError>;

    /// Reference for the clock generator, e.g. "system" or "extclk".
    fn clkgen_src(&mut self) -> Result<String, HuskyError>;
    fn set_clkgen_src(&mut self, src: &str) -> Result<(), HuskyError>;

    /// ADC sampling clock as a multiple of the target clock.
    fn adc_mul(&mut self) -> Result<u32, HuskyError>;
    fn set_adc_mul(&mut self, mul: u32) -> Result<(), HuskyError>;

    /// ADC sampling frequency in Hz.
    fn adc_freq(&mut self) -> Result<f64, HuskyError>;

    /// PLL substructure, or `None` on scopes without one.
    fn pll(&mut self) -> Option<&mut dyn Pll> {
        None
    }
}

pub trait Pll {
    fn pll_locked(&mut self) -> Result<bool, HuskyError>;
}

/// Target-facing I/O pins and the glitch MOSFETs.
pub trait Io {
    /// Function of the HS2 pin, e.g. "clkgen" or "glitch".
    fn hs2(&mut self) -> Result<String, HuskyError>;
    fn set_hs2(&mut self, function: &str) -> Result<(), HuskyError>;

    fn glitch_lp(&mut self) -> Result<bool, HuskyError>;
    fn set_glitch_lp(&mut self, enabled: bool) -> Result<(), HuskyError>;

    fn glitch_hp(&mut self) -> Result<bool, HuskyError>;
    fn set_glitch_hp(&mut self, enabled: bool) -> Result<(), HuskyError>;

    /// State of the target reset line, e.g. "high_z" or "low".
    fn nrst(&mut self) -> Result<String, HuskyError>;
    fn set_nrst(&mut self, state: &str) -> Result<(), HuskyError>;

    /// Clear a latched voltage glitch fault by cycling the glitch MOSFETs.
    fn vglitch_reset(&mut self) -> Result<(), HuskyError>;
}

/// Capture settings and status of the ADC.
pub trait Adc {
    fn samples(&mut self) -> Result<u32, HuskyError>;
    fn set_samples(&mut self, samples: u32) -> Result<(), HuskyError>;

    /// Capture timeout in seconds.
    fn timeout(&mut self) -> Result<f64, HuskyError>;
    fn set_timeout(&mut self, timeout: f64) -> Result<(), HuskyError>;

    /// Clock cycles the trigger was high during the last capture.
    fn trig_count(&mut self) -> Result<u32, HuskyError>;

    /// Whether the ADC is armed and waiting for a trigger.
    fn state(&mut self) -> Result<bool, HuskyError>;

    fn lo_gain_errors_disabled(&mut self) -> Result<bool, HuskyError>;
    fn set_lo_gain_errors_disabled(&mut self, disabled: bool) -> Result<(), HuskyError>;

    fn clip_errors_disabled(&mut self) -> Result<bool, HuskyError>;
    fn set_clip_errors_disabled(&mut self, disabled: bool) -> Result<(), HuskyError>;
}

pub trait Trigger {
    /// Active trigger module, e.g. "basic".
    fn module(&mut self) -> Result<String, HuskyError>;
    fn set_module(&mut self, module: &str) -> Result<(), HuskyError>;
}

/// The device under test, reached through the scope's serial link.
pub trait Target: Send {
    fn baud(&mut self) -> Result<u32, HuskyError>;
    fn set_baud(&mut self, baud: u32) -> Result<(), HuskyError>;

    /// Number of received bytes waiting to be read.
    fn in_waiting(&mut self) -> Result<u32, HuskyError>;

    /// Release the connection. Further calls are invalid.
    fn disconnect(&mut self) -> Result<(), HuskyError>;
}
