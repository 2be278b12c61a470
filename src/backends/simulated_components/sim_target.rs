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

//! In-memory SimpleSerial target.

use crate::backends::device::Target;
use crate::backends::simulated_components::checks::{FaultSet, check_range};
use crate::error::HuskyError;
use log::{info, trace};

const DEFAULT_BAUD: u32 = 38_400;

/// A target board answering over a simulated serial link.
#[derive(Debug)]
pub struct SimulatedTarget {
    platform: String,
    faults: FaultSet,
    connected: bool,
    baud: u32,
    in_waiting: u32,
}

impl SimulatedTarget {
    pub fn new(platform: &str, faults: FaultSet) -> Self {
        SimulatedTarget {
            platform: platform.to_owned(),
            faults,
            connected: true,
            baud: DEFAULT_BAUD,
            in_waiting: 0,
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Target for SimulatedTarget {
    fn baud(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("target.baud")?;
        Ok(self.baud)
    }

    fn set_baud(&mut self, baud: u32) -> Result<(), HuskyError> {
        let path = "target.baud";
        self.faults.check(path)?;
        check_range(path, baud, 300..=1_000_000)?;
        trace!("{}: baud {} -> {baud}", self.platform, self.baud);
        self.baud = baud;
        Ok(())
    }

    fn in_waiting(&mut self) -> Result<u32, HuskyError> {
        self.faults.check("target.in_waiting()")?;
        Ok(self.in_waiting)
    }

    fn disconnect(&mut self) -> Result<(), HuskyError> {
        if !self.connected {
            return Err(HuskyError::device("target", "not connected"));
        }
        self.connected = false;
        info!("Disconnected simulated {} target", self.platform);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use rstest::*;

    #[gtest]
    #[rstest]
    #[case::default_rate(38_400, true)]
    #[case::fast(230_400, true)]
    #[case::zero(0, false)]
    #[case::too_fast(2_000_000, false)]
    fn test_set_baud(#[case] baud: u32, #[case] accepted: bool) {
        let mut target = SimulatedTarget::new("CW308_SAM4S", FaultSet::default());
        expect_that!(target.set_baud(baud).is_ok(), eq(accepted));
        let expected = if accepted { baud } else { DEFAULT_BAUD };
        expect_that!(target.baud(), ok(eq(&expected)));
    }

    #[gtest]
    fn test_in_waiting_fault() {
        let mut target =
            SimulatedTarget::new("CW308_SAM4S", FaultSet::parse("target.in_waiting()"));
        expect_that!(
            target.in_waiting(),
            err(displays_as(contains_substring("injected fault")))
        );
        expect_that!(target.baud(), ok(eq(&DEFAULT_BAUD)));
    }

    #[gtest]
    fn test_disconnect() {
        let mut target = SimulatedTarget::new("CW308_SAM4S", FaultSet::default());
        expect_that!(target.platform(), eq("CW308_SAM4S"));
        expect_that!(target.disconnect(), ok(anything()));
        expect_that!(target.is_connected(), eq(false));
    }
}
