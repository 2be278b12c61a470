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

//! Backends that run against in-memory device models instead of USB hardware.
//!
//! * `husky-sim` - a ChipWhisperer Husky
//! * `lite-sim` - a ChipWhisperer Lite, which lacks the Husky PLL and MMCM status
//!
//! Both read [`SIM_FAULTS_ENV`](crate::config::SIM_FAULTS_ENV) when they connect, so any
//! API path can be made to fail from the outside. A backend built with `with_faults` uses
//! the given [`FaultSet`] instead and ignores the environment.

use crate::backends::backend::Backend;
use crate::backends::device::{Scope, Target};
use crate::backends::simulated_components::checks::FaultSet;
use crate::backends::simulated_components::sim_scope::{SimModel, SimulatedScope};
use crate::backends::simulated_components::sim_target::SimulatedTarget;
use crate::error::HuskyError;
use huskyprobe_macros::backend;
use log::{info, trace};

fn sim_version() -> String {
    format!("sim-{}", env!("CARGO_PKG_VERSION"))
}

fn resolve_faults(faults: &Option<FaultSet>) -> FaultSet {
    faults.clone().unwrap_or_else(FaultSet::from_env)
}

fn connect_scope(model: SimModel, faults: FaultSet) -> Result<Box<dyn Scope>, HuskyError> {
    if faults.contains("scope") {
        return Err(HuskyError::connection(
            "scope",
            "no ChipWhisperer found (injected fault)",
        ));
    }
    let scope = SimulatedScope::new(model, faults);
    info!("Connected to simulated {model:?} scope");
    Ok(Box::new(scope))
}

fn connect_target(
    scope: &mut dyn Scope,
    platform: &str,
    faults: FaultSet,
) -> Result<Box<dyn Target>, HuskyError> {
    if platform.is_empty() {
        return Err(HuskyError::connection("target", "no platform given"));
    }
    if faults.contains("target") {
        return Err(HuskyError::connection(
            "target",
            "target did not respond (injected fault)",
        ));
    }
    trace!("connecting {platform} through {}", scope.name()?);
    Ok(Box::new(SimulatedTarget::new(platform, faults)))
}

#[backend(name = "husky-sim")]
#[derive(Debug, Default)]
pub struct SimHuskyBackend {
    faults: Option<FaultSet>,
}

impl SimHuskyBackend {
    pub fn new() -> Self {
        trace!("creating new husky-sim backend");
        SimHuskyBackend { faults: None }
    }

    /// Backend whose devices fail on `faults` regardless of the environment.
    pub fn with_faults(faults: FaultSet) -> Self {
        SimHuskyBackend {
            faults: Some(faults),
        }
    }
}

impl Backend for SimHuskyBackend {
    fn name(&self) -> &str {
        Self::BACKEND_NAME
    }

    fn version(&self) -> String {
        sim_version()
    }

    fn connect_scope(&self) -> Result<Box<dyn Scope>, HuskyError> {
        connect_scope(SimModel::Husky, resolve_faults(&self.faults))
    }

    fn connect_target(
        &self,
        scope: &mut dyn Scope,
        platform: &str,
    ) -> Result<Box<dyn Target>, HuskyError> {
        connect_target(scope, platform, resolve_faults(&self.faults))
    }
}

#[backend(name = "lite-sim")]
#[derive(Debug, Default)]
pub struct SimLiteBackend {
    faults: Option<FaultSet>,
}

impl SimLiteBackend {
    pub fn new() -> Self {
        trace!("creating new lite-sim backend");
        SimLiteBackend { faults: None }
    }

    /// Backend whose devices fail on `faults` regardless of the environment.
    pub fn with_faults(faults: FaultSet) -> Self {
        SimLiteBackend {
            faults: Some(faults),
        }
    }
}

impl Backend for SimLiteBackend {
    fn name(&self) -> &str {
        Self::BACKEND_NAME
    }

    fn version(&self) -> String {
        sim_version()
    }

    fn connect_scope(&self) -> Result<Box<dyn Scope>, HuskyError> {
        connect_scope(SimModel::Lite, resolve_faults(&self.faults))
    }

    fn connect_target(
        &self,
        scope: &mut dyn Scope,
        platform: &str,
    ) -> Result<Box<dyn Target>, HuskyError> {
        connect_target(scope, platform, resolve_faults(&self.faults))
    }
}
