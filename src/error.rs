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

//! Error type shared by the device interfaces, the tester and the runner.
//!
//! Device faults are routine here: an unsupported parameter on a given hardware revision
//! or a transient I/O error are expected outcomes. The test primitives in
//! [`tester`](crate::tester) turn every [`HuskyError`] into a failed record, so only
//! [`HuskyError::Connection`] and [`HuskyError::Interrupted`] normally reach the caller.

#[derive(Debug, thiserror::Error)]
pub enum HuskyError {
    #[error("HuskyError::Connection: Failed to connect to {device}: {reason}")]
    Connection { device: String, reason: String },
    #[error("HuskyError::Device: {path} failed: {reason}")]
    Device { path: String, reason: String },
    #[error("HuskyError::Argument: {0}")]
    Argument(String),
    #[error("HuskyError::Unsupported: {0} is not supported on this device")]
    Unsupported(String),
    #[error("HuskyError::Interrupted: Test run interrupted by user")]
    Interrupted,
    #[error("HuskyError::Internal: An Internal error occurred: {0}")]
    Internal(String),
}

impl HuskyError {
    /// Shorthand for a [`HuskyError::Device`] raised while accessing `path`.
    pub fn device(path: impl Into<String>, reason: impl Into<String>) -> Self {
        HuskyError::Device {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`HuskyError::Connection`] raised while connecting to `device`.
    pub fn connection(device: impl Into<String>, reason: impl Into<String>) -> Self {
        HuskyError::Connection {
            device: device.into(),
            reason: reason.into(),
        }
    }
}
