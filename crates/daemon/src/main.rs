// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! failoverd: the recording-worker fleet control plane.
//!
//! Loads configuration, wires the component graph, runs the scheduler, and
//! waits for a shutdown signal to drain the relay pool and exit.

use std::time::Duration;

use fv_daemon::bootstrap::ControlPlane;
use fv_daemon::config;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// How long `shutdown` waits for the relay pool to drain before giving up
/// and exiting anyway.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("failoverd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("failoverd {}", env!("CARGO_PKG_VERSION"));
                println!("Recording-worker fleet failover control plane.");
                println!();
                println!("USAGE:");
                println!("    failoverd");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                println!();
                println!("ENVIRONMENT:");
                println!("    FV_CONFIG_PATH   Path to config.toml (default: $XDG_CONFIG_HOME/failoverd/config.toml)");
                println!("    FV_STATE_DIR     Path to state directory (default: $XDG_STATE_HOME/failoverd)");
                println!("    FV_LOG_DIR       If set, write JSON logs here instead of stderr");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: failoverd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let _log_guard = fv_daemon::logging::install();

    let config = config::load().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e
    })?;
    let state_dir = config::state_dir().map_err(|e| {
        error!(error = %e, "failed to determine state directory");
        e
    })?;

    info!("starting failoverd");

    let plane = match ControlPlane::start(config, &state_dir).await {
        Ok(plane) => plane,
        Err(e) => {
            error!(error = %e, "failed to start control plane");
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("control plane ready");
    println!("READY");

    tokio::select! {
        _ = plane.run_scheduler() => {
            info!("scheduler stopped on its own");
        }
        _ = sigterm.recv() => {
            info!("received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("received SIGINT, shutting down");
        }
    }

    plane.shutdown(SHUTDOWN_GRACE).await;
    info!("failoverd stopped");
    Ok(())
}
