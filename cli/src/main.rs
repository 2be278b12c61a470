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

//! Command line entry point of huskyprobe.
//!
//! Connects to a scope through the selected backend, runs every parameter suite and prints
//! the summary and the verification table. The exit status is 0 when every recorded test
//! passed and 1 when any failed or the scope could not be reached. A first Ctrl-C stops
//! the run at the next step; a second one exits immediately.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`, `error`
//!   or `off`). Defaults to `warn`
//! - `HUSKYPROBE_SIM_FAULTS` - API paths the simulated backends should fail on
//!
//! # Examples
//!
//! ```bash
//! # Scope only, against the simulated Husky
//! huskyprobe
//!
//! # Also test the target, with per-value detail
//! huskyprobe --target --verbose
//!
//! # Make one parameter fail
//! HUSKYPROBE_SIM_FAULTS=scope.glitch.width huskyprobe
//! ```

use clap::Parser;
use huskyprobe::backends::backend::{backend_for_name, list_backends};
#[cfg(feature = "simulated")]
use huskyprobe::backends::simulated::{SimHuskyBackend, SimLiteBackend};
use huskyprobe::config::{BANNER_WIDTH, DEFAULT_BACKEND, DEFAULT_PLATFORM};
use huskyprobe::error::HuskyError;
use huskyprobe::runner::{RunOptions, RunOutcome, execute};
use log::{debug, error};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Parser, Debug)]
#[command(name = "huskyprobe")]
#[command(bin_name = "huskyprobe")]
#[command(about = "Test ChipWhisperer Husky parameters")]
struct Cli {
    #[arg(long = "target", help = "Connect and test target parameters")]
    target: bool,
    #[arg(
        long = "verbose",
        short = 'v',
        help = "Show detailed output for each test"
    )]
    verbose: bool,
    #[arg(
        long = "platform",
        default_value = DEFAULT_PLATFORM,
        help = "Target platform, only used together with --target"
    )]
    platform: String,
    #[arg(
        long = "backend",
        default_value = DEFAULT_BACKEND,
        help = r#"Backend used to reach the scope.
Run with --list-backends to see which backends this build provides.
        "#
    )]
    backend: String,
    #[arg(long = "list-backends", help = "Print the available backends and exit")]
    list_backends: bool,
}

/// Register all backends compiled into this build.
fn register_backends() {
    #[cfg(feature = "simulated")]
    {
        SimHuskyBackend::register_backend();
        SimLiteBackend::register_backend();
    }
}

/// Raise the interrupt flag. Returns whether it was already raised, in which case the
/// current device call is stuck and the process should give up.
fn raise_interrupt(flag: &AtomicBool) -> bool {
    flag.swap(true, Ordering::SeqCst)
}

/// Resolve the backend and perform the run. Blocks until the run ends.
fn run(cli: &Cli, interrupt: Arc<AtomicBool>) -> Result<RunOutcome, HuskyError> {
    let backend = backend_for_name(&cli.backend)?;
    println!("\nBackend: {} ({})", backend.name(), backend.version());
    println!("Verbose mode: {}", cli.verbose);
    println!("Test target: {}", cli.target);

    let options = RunOptions {
        with_target: cli.target,
        platform: cli.platform.clone(),
        verbose: cli.verbose,
    };
    execute(backend.as_ref(), &options, interrupt)
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");
    register_backends();

    if cli.list_backends {
        match list_backends() {
            Ok(names) => {
                for name in names {
                    println!("{name}");
                }
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                error!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let rule = "=".repeat(BANNER_WIDTH);
    println!("{rule}\nChipWhisperer Husky Parameter Test\n{rule}");

    let interrupt = Arc::new(AtomicBool::new(false));
    let flag = interrupt.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if raise_interrupt(&flag) {
                eprintln!("\nInterrupted again, exiting without cleanup.");
                std::process::exit(130);
            }
            debug!("interrupt received, stopping at the next step");
        }
    });

    let outcome = match tokio::task::spawn_blocking(move || run(&cli, interrupt)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Test run panicked: {e}");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(outcome) => {
            println!("\n{}", outcome.closing_line());
            if outcome.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            println!("ERROR: Failed to connect to scope: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    fn test_second_interrupt_is_reported_as_repeat() {
        let flag = AtomicBool::new(false);
        expect_that!(raise_interrupt(&flag), eq(false));
        expect_that!(flag.load(Ordering::SeqCst), eq(true));
        expect_that!(raise_interrupt(&flag), eq(true));
    }
}
