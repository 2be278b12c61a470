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

//! One complete run: connect, test, report, disconnect.
//!
//! Only a failure to reach the scope ends a run without a report. A target that does not
//! answer is dropped with a warning, and a suite that aborts, whether through an
//! unexpected fault or a user interrupt, still leaves every result gathered so far in the
//! report.

use crate::backends::backend::Backend;
use crate::error::HuskyError;
use crate::record::TestResult;
use crate::report::{Summary, render_summary, render_table};
use crate::session::Session;
use crate::suites;
use crate::tester::ParameterTester;
use log::{error, info, warn};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Runtime knobs of a run, filled from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub with_target: bool,
    pub platform: String,
    pub verbose: bool,
}

/// What a run produced.
///
/// # Fields
///
/// * `records` - Every result, in the order the tests ran
/// * `aborted` - The error that stopped the suites early, if any
#[derive(Debug)]
pub struct RunOutcome {
    pub records: Vec<TestResult>,
    pub aborted: Option<HuskyError>,
}

impl RunOutcome {
    pub fn summary(&self) -> Summary {
        Summary::from_records(&self.records)
    }

    /// Whether the process should exit successfully: no recorded test failed.
    pub fn succeeded(&self) -> bool {
        self.summary().all_passed()
    }

    /// Last line printed for the run.
    ///
    /// A run stopped early says so, even when every test it got to passed.
    pub fn closing_line(&self) -> String {
        let summary = self.summary();
        match &self.aborted {
            Some(HuskyError::Interrupted) => format!(
                "Run interrupted after {} tests ({} failed).",
                summary.total, summary.failed
            ),
            Some(_) => format!(
                "Run cut short after {} tests ({} failed).",
                summary.total, summary.failed
            ),
            None if summary.all_passed() => format!("All {} tests passed!", summary.passed),
            None => format!("{} tests failed!", summary.failed),
        }
    }
}

/// Connect through `backend` and, if asked, attach the target.
///
/// # Returns: `Result<Session, HuskyError>`
/// * `Ok(Session)` - Connected session, with or without a target
/// * `Err(HuskyError::Connection)` - The scope could not be reached
pub fn open_session(backend: &dyn Backend, options: &RunOptions) -> Result<Session, HuskyError> {
    println!("\nConnecting to ChipWhisperer Husky...");
    let mut session = Session::connect(backend)?;
    let scope = session.scope();
    let name = scope.name().unwrap_or_else(|_| String::from("Unknown"));
    println!("  Connected: {name}");
    println!("  Is Husky: {}", scope.is_husky());

    if options.with_target {
        println!("\nConnecting to target...");
        match session.attach_target(backend, &options.platform) {
            Ok(()) => println!("  Connected: SimpleSerial2"),
            Err(e) => {
                warn!("Target connection failed: {e}");
                println!("WARNING: Failed to connect to target: {e}");
                println!("  Continuing without target...");
            }
        }
    }
    Ok(session)
}

/// Reset the scope to its defaults and run every suite.
///
/// # Returns: `Result<(), HuskyError>`
/// * `Ok(())` - Every suite ran to the end
/// * `Err(HuskyError)` - The run stopped early; the results so far stay in `tester`
pub fn run_suites(session: &mut Session, tester: &mut ParameterTester) -> Result<(), HuskyError> {
    println!("\nInitializing scope for testing...");
    session.scope().default_setup()?;
    let (scope, target) = session.devices();
    suites::run_all(tester, scope, target)
}

/// Perform a whole run through `backend`, printing progress and the final report.
///
/// # Arguments
///
/// * `backend` - The backend to reach the devices through
/// * `options` - Runtime knobs
/// * `interrupt` - Raised from outside to stop at the next step
///
/// # Returns: `Result<RunOutcome, HuskyError>`
/// * `Ok(RunOutcome)` - The run happened, possibly cut short
/// * `Err(HuskyError::Connection)` - The scope could not be reached, nothing was tested
pub fn execute(
    backend: &dyn Backend,
    options: &RunOptions,
    interrupt: Arc<AtomicBool>,
) -> Result<RunOutcome, HuskyError> {
    let mut session = open_session(backend, options)?;
    let mut tester = ParameterTester::with_interrupt(options.verbose, interrupt);

    let aborted = match run_suites(&mut session, &mut tester) {
        Ok(()) => None,
        Err(HuskyError::Interrupted) => {
            println!("\n\nTest interrupted by user.");
            Some(HuskyError::Interrupted)
        }
        Err(e) => {
            error!("Suite aborted: {e}");
            println!("\nERROR during testing: {e}");
            Some(e)
        }
    };

    let records = tester.into_results();
    print!("{}", render_summary(&records));
    print!("{}", render_table(&records));

    println!("\nCleaning up...");
    session.close();
    println!("  Disconnected successfully.");
    info!("Run finished with {} records", records.len());

    Ok(RunOutcome { records, aborted })
}
