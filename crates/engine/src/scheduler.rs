// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler: three independent fixed-delay jobs driving the Detector, the
//! Registry's inactivity sweep, and the Launcher's reclaim sweep (spec §4.G).
//!
//! [`Timetable`] is the deterministic, `Clock`-agnostic arming/firing logic,
//! tested without a real runtime. [`Scheduler`] wraps it in an async loop
//! that sleeps until the next deadline and dispatches fired jobs as tasks.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// One fixed-delay timer: fires at `next_fire`, then rearms at
/// `fire_time + period` (not "catch up" to the missed rate).
#[derive(Debug, Clone)]
struct Timer {
    id: String,
    period: Duration,
    next_fire: Instant,
}

/// Pure scheduling data structure: which jobs are due, and when the next one
/// is due. Carries no job bodies and no runtime; a caller drives it by
/// calling [`Timetable::fired`] whenever `now` has reached [`Timetable::next_deadline`].
#[derive(Debug, Default)]
pub struct Timetable {
    timers: Vec<Timer>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fixed-delay periodic timer: first fire at `now + initial_delay`.
    pub fn schedule(&mut self, id: impl Into<String>, period: Duration, initial_delay: Duration, now: Instant) {
        self.timers.push(Timer { id: id.into(), period, next_fire: now + initial_delay });
    }

    pub fn cancel(&mut self, id: &str) {
        self.timers.retain(|t| t.id != id);
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.next_fire).min()
    }

    /// Pop every timer whose deadline has passed, rearming each at
    /// `now + period`, and return the fired ids (arbitrary order; "different
    /// jobs may overlap" per spec §4.G).
    pub fn fired(&mut self, now: Instant) -> Vec<String> {
        let mut fired = Vec::new();
        for timer in self.timers.iter_mut() {
            if timer.next_fire <= now {
                fired.push(timer.id.clone());
                timer.next_fire = now + timer.period;
            }
        }
        fired
    }
}

/// Canonical job names (spec §4.G).
pub const DETECT: &str = "DETECT";
pub const CLEANUP: &str = "CLEANUP";
pub const BACKUP_RECLAIM: &str = "BACKUP_RECLAIM";

type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Job = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// Async runner over a [`Timetable`]: sleeps until the next deadline, then
/// spawns every job that fired. A job that is still running when its next
/// deadline arrives is not re-entered (spec §4.G: "jobs never run
/// concurrently with themselves") — each job body is responsible for its own
/// serialization (e.g. the Detector's in-flight guard); the scheduler itself
/// spawns fire-and-forget tasks and does not track completion.
pub struct Scheduler {
    table: Timetable,
    jobs: HashMap<String, Job>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { table: Timetable::new(), jobs: HashMap::new() }
    }

    /// Register a job body and arm its timer in one call.
    pub fn add_job<F, Fut>(&mut self, id: impl Into<String>, period: Duration, initial_delay: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = id.into();
        self.table.schedule(id.clone(), period, initial_delay, Instant::now());
        self.jobs.insert(id, Arc::new(move || Box::pin(job())));
    }

    /// Run until `shutdown` is cancelled. On shutdown, stops arming new work
    /// and returns immediately; in-flight spawned tasks are detached and left
    /// to finish on their own (the grace window is the caller's
    /// responsibility, mirroring `tokio::select!`-based shutdown elsewhere in
    /// this codebase).
    pub async fn run(mut self, shutdown: CancellationToken) {
        loop {
            let Some(deadline) = self.table.next_deadline() else { return };
            tokio::select! {
                _ = shutdown.cancelled() => return,
                _ = tokio::time::sleep_until(deadline.into()) => {}
            }
            if shutdown.is_cancelled() {
                return;
            }
            for id in self.table.fired(Instant::now()) {
                if let Some(job) = self.jobs.get(&id) {
                    tokio::spawn(job());
                }
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
