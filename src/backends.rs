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

pub mod backend;
pub mod device;

#[cfg(feature = "simulated")]
pub mod simulated;

#[cfg(feature = "simulated")]
pub mod simulated_components {
    pub mod checks;
    pub mod sim_scope;
    pub mod sim_target;
}
