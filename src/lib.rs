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

//! huskyprobe walks the documented configuration knobs of a ChipWhisperer Husky and
//! checks that each one can be read, written and read back.
//!
//! # Architecture
//!
//! - [`backends`] - Capability traits for the scope and target, and the registry of
//!   backends that provide them
//! - [`tester`] - The three test primitives, which turn device faults into records
//! - [`suites`] - Fixed checklists of parameters, run in order
//! - [`report`] - Summary and table rendering
//! - [`session`] - Ownership and guaranteed release of the device connections
//! - [`runner`] - One complete run, as driven by the `huskyprobe` binary
//!
//! # Run Flow
//!
//! 1. A backend is looked up by name and connects to the scope (and optionally target)
//! 2. The scope is reset to its default setup
//! 3. Each suite runs its parameters through the [`ParameterTester`](tester::ParameterTester)
//! 4. The accumulated records are rendered as a summary and a table
//! 5. The session disconnects the target, then the scope
//!
//! # Examples
//!
//! ```rust,no_run
//! use huskyprobe::backends::backend::backend_for_name;
//! use huskyprobe::backends::simulated::SimHuskyBackend;
//! use huskyprobe::runner::{RunOptions, execute};
//! use std::sync::Arc;
//! use std::sync::atomic::AtomicBool;
//!
//! # fn main() -> Result<(), huskyprobe::error::HuskyError> {
//! SimHuskyBackend::register_backend();
//! let backend = backend_for_name("husky-sim")?;
//! let options = RunOptions {
//!     with_target: false,
//!     platform: String::from("CW308_SAM4S"),
//!     verbose: false,
//! };
//! let outcome = execute(backend.as_ref(), &options, Arc::new(AtomicBool::new(false)))?;
//! assert!(outcome.succeeded());
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod runner;
pub mod session;
pub mod suites;
pub mod tester;
pub mod value;
