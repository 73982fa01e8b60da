// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup (spec §1: "log formatting" is out of scope as a feature,
//! but installing the subscriber is ambient process bootstrap).
//!
//! `FV_LOG_DIR` unset: human-readable output to stderr, the shape an
//! operator watching the process directly wants. Set: JSON lines to a
//! rotating file under that directory, non-blocking so a slow disk never
//! stalls the scheduler or a request handler.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Returned guard must be held for the process lifetime; dropping it stops
/// the non-blocking writer's background flush thread.
pub fn install() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("FV_LOG_DIR") {
        Ok(dir) => {
            let guard = install_file(&filter.to_string(), Path::new(&dir));
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
            None
        }
    }
}

fn install_file(filter: &str, dir: &Path) -> WorkerGuard {
    let _ = std::fs::create_dir_all(dir);
    let appender = tracing_appender::rolling::daily(dir, "failoverd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().json().with_writer(non_blocking)).init();
    guard
}
