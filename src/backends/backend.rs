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

//! Backend abstraction and registry.
//!
//! A [`Backend`] knows how to open a connection to a scope and, through that scope, to a
//! target. Backends register themselves under a name at startup and the runner looks the
//! selected one up by that name.
//!
//! # Backend Registration
//!
//! Backends are defined using the `#[backend]` macro, which generates a
//! `register_backend()` associated function, and are included or excluded using cargo
//! "features". See [`simulated`](crate::backends::simulated) for the in-memory backends.
//!
//! # Examples
//!
//! in `main.rs`:
//! ```rust,no_run
//! #[cfg(feature = "simulated")]
//! use huskyprobe::backends::simulated::{SimHuskyBackend, SimLiteBackend};
//!
//! fn register_backends() {
//!     #[cfg(feature = "simulated")]
//!     {
//!         SimHuskyBackend::register_backend();
//!         SimLiteBackend::register_backend();
//!     }
//! }
//! ```

use crate::backends::device::{Scope, Target};
use crate::error::HuskyError;
use log::trace;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Type alias for backend constructor functions.
///
/// Backend constructors take no arguments and return a boxed Backend trait object.
/// These functions are stored in the backend registry and called when the backend is
/// selected.
type BackendConstructor = fn() -> Box<dyn Backend>;

/// Global registry of backend implementations, keyed by backend name.
///
/// Initialized on first registration via [`register_backend`] and read through
/// [`backend_for_name`] and [`list_backends`].
pub static BACKEND_REGISTRY: OnceLock<Mutex<HashMap<&'static str, BackendConstructor>>> =
    OnceLock::new();

/// Trait representing a way of reaching the hardware.
///
/// # Examples
///
/// ```rust,no_run
/// # use huskyprobe::backends::backend::backend_for_name;
/// # fn example() -> Result<(), huskyprobe::error::HuskyError> {
/// let backend = backend_for_name("husky-sim")?;
/// let mut scope = backend.connect_scope()?;
/// let target = backend.connect_target(scope.as_mut(), "CW308_SAM4S")?;
/// # Ok(())
/// # }
/// ```
pub trait Backend: Any + Send {
    /// Name the backend is registered under.
    fn name(&self) -> &str;

    /// Version of the control library behind this backend.
    fn version(&self) -> String;

    /// Open a connection to the first available scope.
    ///
    /// # Returns: `Result<Box<dyn Scope>, HuskyError>`
    /// * `Ok(Box<dyn Scope>)` - Connected scope
    /// * `Err(HuskyError::Connection)` - No scope could be reached
    fn connect_scope(&self) -> Result<Box<dyn Scope>, HuskyError>;

    /// Open a serial connection to the target attached to `scope`.
    ///
    /// # Arguments
    ///
    /// * `scope` - The connected scope the target hangs off
    /// * `platform` - Target board identity, e.g. "CW308_SAM4S"
    ///
    /// # Returns: `Result<Box<dyn Target>, HuskyError>`
    /// * `Ok(Box<dyn Target>)` - Connected target
    /// * `Err(HuskyError::Connection)` - The target did not respond
    fn connect_target(
        &self,
        scope: &mut dyn Scope,
        platform: &str,
    ) -> Result<Box<dyn Target>, HuskyError>;
}

/// Initialize the backend registry.
///
/// # Returns: `Mutex<HashMap<&'static str, BackendConstructor>>`
/// * Empty mutex-protected HashMap ready for backend registration
pub fn init_backend_registry() -> Mutex<HashMap<&'static str, BackendConstructor>> {
    Mutex::new(HashMap::new())
}

/// Register a backend implementation in the global registry.
///
/// Registering a name twice replaces the earlier constructor.
///
/// # Arguments
///
/// * `name` - Name used to select the backend, e.g. "husky-sim"
/// * `constructor` - Function that creates a new backend instance
///
/// # Panics
///
/// Panics if the registry lock is poisoned (should never happen in normal operation).
pub fn register_backend(name: &'static str, constructor: BackendConstructor) {
    let mut registry = BACKEND_REGISTRY
        .get_or_init(init_backend_registry)
        .lock()
        .expect("couldnt get BACKEND_REGISTRY");

    trace!("registering backend '{name}'");
    registry.insert(name, constructor);
}

/// Construct the backend registered under `name`.
///
/// # Arguments
///
/// * `name` - Registered backend name, matched exactly
///
/// # Returns: `Result<Box<dyn Backend>, HuskyError>`
/// * `Ok(Box<dyn Backend>)` - Newly constructed backend instance
/// * `Err(HuskyError::Internal)` - Registry not initialized or lock failure
/// * `Err(HuskyError::Argument)` - No backend of that name
pub fn backend_for_name(name: &str) -> Result<Box<dyn Backend>, HuskyError> {
    let registry = BACKEND_REGISTRY
        .get()
        .ok_or(HuskyError::Internal(String::from(
            "couldn't get BACKEND_REGISTRY",
        )))?
        .lock()
        .map_err(|_| HuskyError::Internal(String::from("couldn't lock BACKEND_REGISTRY")))?;

    match registry.get(name) {
        Some(constructor) => Ok(constructor()),
        None => Err(HuskyError::Argument(format!(
            "huskyprobe has no backend called {name:?}. Known backends: {}",
            sorted_names(&registry).join(", ")
        ))),
    }
}

/// List the names of all registered backends, sorted.
///
/// # Returns: `Result<Vec<String>, HuskyError>`
/// * `Ok(Vec<String>)` - Registered names, empty if nothing registered yet
/// * `Err(HuskyError::Internal)` - Lock failure
pub fn list_backends() -> Result<Vec<String>, HuskyError> {
    match BACKEND_REGISTRY.get() {
        None => Ok(Vec::new()),
        Some(registry) => {
            let registry = registry.lock().map_err(|_| {
                HuskyError::Internal(String::from("couldn't lock BACKEND_REGISTRY"))
            })?;
            Ok(sorted_names(&registry))
        }
    }
}

fn sorted_names(registry: &HashMap<&'static str, BackendConstructor>) -> Vec<String> {
    let mut names: Vec<String> = registry.keys().map(|k| k.to_string()).collect();
    names.sort();
    names
}

#[cfg(all(test, feature = "simulated"))]
mod tests {
    use super::*;
    use crate::backends::simulated::{SimHuskyBackend, SimLiteBackend};
    use googletest::prelude::*;
    use std::any::Any;

    fn setup_test_registry() {
        SimHuskyBackend::register_backend();
        SimLiteBackend::register_backend();
    }

    #[gtest]
    fn test_backend_for_name_husky() {
        setup_test_registry();
        let backend = backend_for_name("husky-sim").unwrap();

        let as_husky = (backend.as_ref() as &dyn Any).downcast_ref::<SimHuskyBackend>();
        expect_that!(as_husky.is_some(), eq(true), "should be a SimHuskyBackend");
        expect_that!(backend.name(), eq("husky-sim"));
    }

    #[gtest]
    fn test_backend_for_name_lite() {
        setup_test_registry();
        let backend = backend_for_name("lite-sim").unwrap();

        let backend_any = backend.as_ref() as &dyn Any;
        expect_that!(backend_any.is::<SimLiteBackend>(), eq(true));
    }

    #[gtest]
    fn test_backend_for_name_unknown_fails() {
        setup_test_registry();
        expect_that!(
            backend_for_name("usb").map(|b| b.name().to_string()),
            err(displays_as(contains_substring("no backend called \"usb\"")))
        );
    }

    #[gtest]
    fn test_backend_for_name_case_sensitive() {
        setup_test_registry();
        expect_that!(backend_for_name("HUSKY-SIM").is_err(), eq(true));
    }

    #[gtest]
    fn test_list_backends_sorted() {
        setup_test_registry();
        let names = list_backends().unwrap();
        let husky = names.iter().position(|n| n == "husky-sim");
        let lite = names.iter().position(|n| n == "lite-sim");

        expect_that!(husky.is_some(), eq(true));
        expect_that!(lite.is_some(), eq(true));
        expect_that!(husky < lite, eq(true));
    }
}
