// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness Detector: periodic scan classifying sessions as healthy,
//! timed-out, or stuck (spec §4.D).

use crate::registry::Registry;
use fv_core::{Clock, Session};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Launcher-side seam the detector consults before flagging a session, and
/// invokes once a session is classified FAILED.
#[async_trait::async_trait]
pub trait BackupStarter: Send + Sync {
    /// True if a backup is already tracked for this session id.
    fn is_tracked(&self, session_id: &str) -> bool;

    async fn start_backup(&self, session: &Session);
}

/// Outcome of one detector tick, surfaced for tests and `failover.status`.
#[derive(Debug, Default, Clone)]
pub struct DetectorTickReport {
    pub scanned: usize,
    pub failed_heartbeat: Vec<String>,
    pub failed_stuck: Vec<String>,
}

pub struct LivenessDetector<C: Clock> {
    registry: Arc<Registry<C>>,
    launcher: Arc<dyn BackupStarter>,
    clock: C,
    hb_timeout: Duration,
    stuck_timeout: Duration,
    enabled: Arc<AtomicBool>,
    /// Guards against overlapping ticks (spec §4.D: "ticks are serialized").
    in_flight: Arc<AtomicBool>,
}

impl<C: Clock> LivenessDetector<C> {
    pub fn new(
        registry: Arc<Registry<C>>,
        launcher: Arc<dyn BackupStarter>,
        clock: C,
        hb_timeout: Duration,
        stuck_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            launcher,
            clock,
            hb_timeout,
            stuck_timeout,
            enabled: Arc::new(AtomicBool::new(true)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Run one detector pass. Safe to call both from the scheduler tick and
    /// from a manual operator trigger (`failover.check`); overlapping calls
    /// short-circuit rather than run concurrently.
    pub async fn tick(&self) -> DetectorTickReport {
        if !self.is_enabled() {
            return DetectorTickReport::default();
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return DetectorTickReport::default();
        }
        let report = self.run_pass().await;
        self.in_flight.store(false, Ordering::SeqCst);
        report
    }

    async fn run_pass(&self) -> DetectorTickReport {
        let now = self.clock.epoch_ms();
        let active = self.registry.list_active();
        let mut report = DetectorTickReport { scanned: active.len(), ..Default::default() };

        for session in active {
            if self.launcher.is_tracked(session.id.as_str()) {
                continue;
            }
            if !session.is_active() {
                continue;
            }
            let hb_age = Duration::from_millis(now.saturating_sub(session.last_heartbeat_ms));

            let heartbeat_timed_out = hb_age > self.hb_timeout;
            let stuck = session.last_chunk.is_some() && hb_age > self.stuck_timeout;

            if heartbeat_timed_out {
                report.failed_heartbeat.push(session.id.as_str().to_string());
            }
            if stuck {
                report.failed_stuck.push(session.id.as_str().to_string());
            }
            if heartbeat_timed_out || stuck {
                self.launcher.start_backup(&session).await;
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
