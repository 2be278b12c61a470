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

/// The target board identity used when `--platform` is not given. Typically a CW308 UFO
/// board carrying a SAM4S.
pub static DEFAULT_PLATFORM: &str = "CW308_SAM4S";

/// The backend used when `--backend` is not given.
pub static DEFAULT_BACKEND: &str = "husky-sim";

/// Relative tolerance applied when a floating point value is read back after a write.
/// Clock frequencies come back quantised to the PLL step, so exact equality is too strict.
pub const FLOAT_RELATIVE_TOLERANCE: f64 = 0.01;

/// Absolute bound used instead of [`FLOAT_RELATIVE_TOLERANCE`] when the written value is zero.
pub const FLOAT_NEAR_ZERO: f64 = 0.01;

/// Width of the `=` rules printed around section titles.
pub const BANNER_WIDTH: usize = 60;

/// Column budgets of the parameter table: parameter, API path, status and notes.
pub const TABLE_COLUMN_WIDTHS: [usize; 4] = [25, 30, 6, 30];

/// Environment variable holding a comma separated list of API paths which the simulated
/// backends should fail on, e.g. `scope.glitch.width,target.baud`. The keys `scope` and
/// `target` make the respective connection fail.
pub static SIM_FAULTS_ENV: &str = "HUSKYPROBE_SIM_FAULTS";
