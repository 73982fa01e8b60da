// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relay metrics (spec §4.F): monotonic counters plus timestamps, atomic so
//! a benign race on read is acceptable (spec §5 shared-resource policy).

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RelayMetrics {
    successes: AtomicU64,
    failures: AtomicU64,
    in_flight: AtomicU64,
    last_request_ms: AtomicI64,
    last_success_ms: AtomicI64,
    last_failure_ms: AtomicI64,
}

/// A point-in-time read of [`RelayMetrics`], for `failover.status` (spec §11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayMetricsSnapshot {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    pub in_flight: u64,
    pub last_request_ms: Option<u64>,
    pub last_success_ms: Option<u64>,
    pub last_failure_ms: Option<u64>,
}

impl RelayMetricsSnapshot {
    /// `successRate = successes/total` when `total > 0` (spec P7).
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.successes as f64 / self.total as f64)
        }
    }
}

impl RelayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A delivery was accepted for forwarding: `total` grows, `in_flight` grows.
    /// P7 holds by construction: `total == successes + failures + in_flight`
    /// at every point because this is the only place `total` advances.
    pub fn record_scheduled(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_attempt(&self, now_ms: u64) {
        self.last_request_ms.store(now_ms as i64, Ordering::SeqCst);
    }

    pub fn record_success(&self, now_ms: u64) {
        self.successes.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.last_success_ms.store(now_ms as i64, Ordering::SeqCst);
    }

    pub fn record_failure(&self, now_ms: u64) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.last_failure_ms.store(now_ms as i64, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> RelayMetricsSnapshot {
        let successes = self.successes.load(Ordering::SeqCst);
        let failures = self.failures.load(Ordering::SeqCst);
        let in_flight = self.in_flight.load(Ordering::SeqCst);
        RelayMetricsSnapshot {
            total: successes + failures + in_flight,
            successes,
            failures,
            in_flight,
            last_request_ms: non_negative(self.last_request_ms.load(Ordering::SeqCst)),
            last_success_ms: non_negative(self.last_success_ms.load(Ordering::SeqCst)),
            last_failure_ms: non_negative(self.last_failure_ms.load(Ordering::SeqCst)),
        }
    }
}

fn non_negative(v: i64) -> Option<u64> {
    if v <= 0 {
        None
    } else {
        Some(v as u64)
    }
}
