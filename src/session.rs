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

//! Ownership of the device connections for one run.
//!
//! A [`Session`] owns the connected scope and, optionally, the target. Suites only ever
//! borrow them through [`Session::devices`]. Both connections are released exactly once,
//! either by an explicit [`Session::close`] or when the session is dropped, so an
//! interrupted or aborted run still disconnects.

use crate::backends::backend::Backend;
use crate::backends::device::{Scope, Target};
use crate::error::HuskyError;
use log::{debug, info};

pub struct Session {
    scope: Box<dyn Scope>,
    target: Option<Box<dyn Target>>,
    closed: bool,
}

impl Session {
    /// Wrap already connected devices.
    pub fn new(scope: Box<dyn Scope>, target: Option<Box<dyn Target>>) -> Self {
        Session {
            scope,
            target,
            closed: false,
        }
    }

    /// Connect to the scope through `backend`.
    ///
    /// # Returns: `Result<Session, HuskyError>`
    /// * `Ok(Session)` - A session holding the scope and no target
    /// * `Err(HuskyError::Connection)` - The scope could not be reached
    pub fn connect(backend: &dyn Backend) -> Result<Self, HuskyError> {
        let scope = backend.connect_scope()?;
        info!("Session opened through backend '{}'", backend.name());
        Ok(Session::new(scope, None))
    }

    /// Connect to the target hanging off this session's scope.
    ///
    /// On failure the session is left without a target, and the target suite is skipped.
    ///
    /// # Arguments
    ///
    /// * `backend` - The backend the scope was connected through
    /// * `platform` - Target board identity, e.g. "CW308_SAM4S"
    ///
    /// # Returns: `Result<(), HuskyError>`
    /// * `Ok(())` - The target is attached
    /// * `Err(HuskyError::Connection)` - The target did not respond
    pub fn attach_target(&mut self, backend: &dyn Backend, platform: &str) -> Result<(), HuskyError> {
        let target = backend.connect_target(self.scope.as_mut(), platform)?;
        info!("Attached {platform} target");
        self.target = Some(target);
        Ok(())
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn scope(&mut self) -> &mut dyn Scope {
        self.scope.as_mut()
    }

    /// Borrow the scope and the target at the same time.
    pub fn devices(&mut self) -> (&mut dyn Scope, Option<&mut dyn Target>) {
        let target: Option<&mut dyn Target> = match self.target.as_mut() {
            Some(target) => Some(target.as_mut()),
            None => None,
        };
        (self.scope.as_mut(), target)
    }

    /// Disconnect the target, then the scope. Faults are logged and otherwise ignored.
    ///
    /// Only the first call does anything.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(target) = self.target.as_mut() {
            match target.disconnect() {
                Ok(()) => debug!("Target disconnected"),
                Err(e) => debug!("Ignoring failure to disconnect target: {e}"),
            }
        }
        match self.scope.disconnect() {
            Ok(()) => info!("Session closed"),
            Err(e) => debug!("Ignoring failure to disconnect scope: {e}"),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(all(test, feature = "simulated"))]
mod tests {
    use super::*;
    use crate::backends::device::{Adc, Clock, Glitch, Io, Trigger, VglitchMode};
    use crate::backends::simulated::SimHuskyBackend;
    use crate::backends::simulated_components::checks::FaultSet;
    use crate::backends::simulated_components::sim_scope::{SimModel, SimulatedScope};
    use googletest::prelude::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    /// Simulated scope that logs its disconnects.
    struct LoggingScope {
        inner: SimulatedScope,
        log: Log,
        fail_disconnect: bool,
    }

    impl Scope for LoggingScope {
        fn name(&mut self) -> Result<String, HuskyError> {
            self.inner.name()
        }
        fn is_husky(&self) -> bool {
            self.inner.is_husky()
        }
        fn default_setup(&mut self) -> Result<(), HuskyError> {
            self.inner.default_setup()
        }
        fn arm(&mut self) -> Result<(), HuskyError> {
            self.inner.arm()
        }
        fn vglitch_setup(&mut self, mode: VglitchMode, default_setup: bool) -> Result<(), HuskyError> {
            self.inner.vglitch_setup(mode, default_setup)
        }
        fn disconnect(&mut self) -> Result<(), HuskyError> {
            self.log.lock().unwrap().push("scope");
            if self.fail_disconnect {
                return Err(HuskyError::device("scope", "usb gone"));
            }
            self.inner.disconnect()
        }
        fn glitch(&mut self) -> &mut dyn Glitch {
            self.inner.glitch()
        }
        fn clock(&mut self) -> &mut dyn Clock {
            self.inner.clock()
        }
        fn io(&mut self) -> &mut dyn Io {
            self.inner.io()
        }
        fn adc(&mut self) -> &mut dyn Adc {
            self.inner.adc()
        }
        fn trigger(&mut self) -> &mut dyn Trigger {
            self.inner.trigger()
        }
    }

    struct LoggingTarget {
        log: Log,
    }

    impl Target for LoggingTarget {
        fn baud(&mut self) -> Result<u32, HuskyError> {
            Ok(38400)
        }
        fn set_baud(&mut self, _baud: u32) -> Result<(), HuskyError> {
            Ok(())
        }
        fn in_waiting(&mut self) -> Result<u32, HuskyError> {
            Ok(0)
        }
        fn disconnect(&mut self) -> Result<(), HuskyError> {
            self.log.lock().unwrap().push("target");
            Ok(())
        }
    }

    fn logging_session(log: &Log, with_target: bool, fail_disconnect: bool) -> Session {
        let scope = LoggingScope {
            inner: SimulatedScope::new(SimModel::Husky, FaultSet::default()),
            log: log.clone(),
            fail_disconnect,
        };
        let target: Option<Box<dyn Target>> = if with_target {
            Some(Box::new(LoggingTarget { log: log.clone() }))
        } else {
            None
        };
        Session::new(Box::new(scope), target)
    }

    #[gtest]
    fn test_drop_disconnects_target_then_scope() {
        let log = Log::default();
        drop(logging_session(&log, true, false));
        let entries = log.lock().unwrap().clone();
        expect_that!(entries, eq(&vec!["target", "scope"]));
    }

    #[gtest]
    fn test_close_then_drop_disconnects_once() {
        let log = Log::default();
        let mut session = logging_session(&log, false, false);
        session.close();
        expect_that!(session.is_closed(), eq(true));
        drop(session);
        let entries = log.lock().unwrap().clone();
        expect_that!(entries, eq(&vec!["scope"]));
    }

    #[gtest]
    fn test_disconnect_fault_is_swallowed() {
        let log = Log::default();
        let mut session = logging_session(&log, false, true);
        session.close();
        expect_that!(session.is_closed(), eq(true));
        expect_that!(log.lock().unwrap().len(), eq(1));
    }

    #[gtest]
    fn test_connect_and_attach_target() {
        let backend = SimHuskyBackend::new();
        let mut session = Session::connect(&backend).unwrap();
        expect_that!(session.has_target(), eq(false));

        session.attach_target(&backend, "CW308_SAM4S").unwrap();
        let (scope, target) = session.devices();
        expect_that!(scope.is_husky(), eq(true));
        expect_that!(target.is_some(), eq(true));
    }
}
