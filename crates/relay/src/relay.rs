// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification Relay (spec §4.F): forwards inbound notifications to an
//! operator-configured receiver on a bounded worker pool with retry, and
//! performs the synchronous terminal-status shortcut against the registry.

use crate::headers::{build_headers, parse_default_headers};
use crate::metrics::{RelayMetrics, RelayMetricsSnapshot};
use crate::transport::{HttpTransport, OutboundRequest, TransportResponse};
use fv_core::RelayConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Seam back into the Registry for the terminal-status shortcut (spec §4.F:
/// "invokes Registry `setStatus(id, STOPPING)`"). Kept as a trait so this
/// crate does not depend on `fv-engine`; `fv-daemon` wires the real adapter.
pub trait SessionStopHook: Send + Sync {
    /// Returns `true` if a session with this id exists and was transitioned.
    fn mark_stopping(&self, session_id: &str) -> bool;
}

/// An inbound call to the webhook surface (spec §4.H `webhook.receive`).
#[derive(Debug, Clone)]
pub struct InboundNotification {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Acknowledgement returned synchronously from the inbound path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAck {
    /// Delivery was scheduled (or run inline under backpressure).
    Scheduled,
    /// No receiver configured; nothing was scheduled.
    Disabled,
    /// A bare `GET` with no payload: a health probe, not a delivery.
    HealthProbe,
}

pub struct NotificationRelay {
    config: RelayConfig,
    service_id: String,
    transport: Arc<dyn HttpTransport>,
    clock: fv_core::SystemClock,
    metrics: Arc<RelayMetrics>,
    default_headers: HashMap<String, String>,
    /// Bounds concurrent in-flight deliveries to `pool_max` (spec §5: "bounded:
    /// core/max/queue configurable"). Tokio tasks have no persistent thread
    /// to keep "core" warm, so `pool_core` is accepted for configuration
    /// parity but only `pool_max`/`pool_queue` affect scheduling.
    concurrency: Arc<Semaphore>,
    queued: Arc<AtomicUsize>,
    stop_hook: Option<Arc<dyn SessionStopHook>>,
}

impl NotificationRelay {
    pub fn new(
        config: RelayConfig,
        service_id: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let default_headers = parse_default_headers(config.headers.as_deref());
        let concurrency = Arc::new(Semaphore::new(config.pool_max.max(1)));
        Self {
            service_id: service_id.into(),
            transport,
            clock: fv_core::SystemClock,
            metrics: Arc::new(RelayMetrics::new()),
            default_headers,
            concurrency,
            queued: Arc::new(AtomicUsize::new(0)),
            stop_hook: None,
            config,
        }
    }

    pub fn with_stop_hook(mut self, hook: Arc<dyn SessionStopHook>) -> Self {
        self.stop_hook = Some(hook);
        self
    }

    pub fn metrics(&self) -> RelayMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Wait, bounded by `timeout`, for every in-flight and queued delivery to
    /// finish (spec §5: "drains the relay pool (bounded wait)" on shutdown).
    /// Returns `true` if the pool drained; `false` if the timeout elapsed
    /// with deliveries still outstanding.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let permits = self.config.pool_max.max(1) as u32;
        tokio::time::timeout(timeout, self.concurrency.clone().acquire_many_owned(permits))
            .await
            .is_ok()
    }

    /// Handle one inbound call (spec §4.F): schedule the forward, and
    /// perform the synchronous secondary action before returning.
    pub fn receive(&self, notification: InboundNotification) -> RelayAck {
        if notification.method.eq_ignore_ascii_case("GET") && notification.body.is_none() {
            return RelayAck::HealthProbe;
        }

        self.apply_terminal_status_shortcut(notification.body.as_deref());

        if !self.config.enabled || self.config.url.is_none() {
            return RelayAck::Disabled;
        }

        self.schedule_delivery(notification);
        RelayAck::Scheduled
    }

    /// "if the payload parses as JSON and contains a recognized terminal
    /// status (`status == "stopped"`), invoke Registry `setStatus(id,
    /// STOPPING)`" (spec §4.F). Fire-and-forget: id/status absent or session
    /// missing is log-only, never surfaced to the caller (Q2: `id` is the
    /// authoritative field per this expansion's DESIGN.md decision).
    fn apply_terminal_status_shortcut(&self, body: Option<&str>) {
        let Some(hook) = &self.stop_hook else { return };
        let Some(body) = body else { return };
        let Ok(value) = serde_json::from_str::<Value>(body) else { return };
        let Some(status) = value.get("status").and_then(Value::as_str) else { return };
        if status != "stopped" {
            return;
        }
        let Some(id) = value.get("id").and_then(Value::as_str) else {
            tracing::debug!("relay terminal-status shortcut: payload missing `id`");
            return;
        };
        if !hook.mark_stopping(id) {
            tracing::debug!(session = id, "relay terminal-status shortcut: session not found");
        }
    }

    fn schedule_delivery(&self, notification: InboundNotification) {
        self.metrics.record_scheduled();

        let task = DeliveryTask {
            config: self.config.clone(),
            service_id: self.service_id.clone(),
            transport: self.transport.clone(),
            metrics: self.metrics.clone(),
            default_headers: self.default_headers.clone(),
            clock: self.clock,
            notification,
        };

        // "caller runs" backpressure (spec §4.F, §5): try to grab a permit
        // immediately; if the pool is saturated but there's still queue
        // capacity, spawn a task that waits for a permit; once both are
        // exhausted, deliver on the caller's own task rather than reject.
        if let Ok(permit) = self.concurrency.clone().try_acquire_owned() {
            tokio::spawn(async move {
                let _permit = permit;
                task.run().await;
            });
            return;
        }

        if self.queued.load(Ordering::SeqCst) < self.config.pool_queue {
            self.queued.fetch_add(1, Ordering::SeqCst);
            let concurrency = self.concurrency.clone();
            let queued = self.queued.clone();
            tokio::spawn(async move {
                let permit = concurrency.acquire_owned().await;
                queued.fetch_sub(1, Ordering::SeqCst);
                let _permit = permit;
                task.run().await;
            });
            return;
        }

        // Pool and queue both saturated: absorb the burst on the caller's own
        // task rather than spawn another unbounded one (spec §5: "caller
        // runs"). Same pattern as `ChunkGc::dispatch`'s synchronous mode:
        // hand the blocking wait to a dedicated thread via
        // `block_in_place` so the delivery genuinely runs before `receive`
        // returns, instead of detaching and bypassing `pool_max`.
        let handle = tokio::runtime::Handle::current();
        tokio::task::block_in_place(|| handle.block_on(task.run()));
    }
}

struct DeliveryTask {
    config: RelayConfig,
    service_id: String,
    transport: Arc<dyn HttpTransport>,
    metrics: Arc<RelayMetrics>,
    default_headers: HashMap<String, String>,
    clock: fv_core::SystemClock,
    notification: InboundNotification,
}

#[derive(Debug, PartialEq, Eq)]
enum Classification {
    Success,
    Permanent,
    Retryable,
}

impl DeliveryTask {
    async fn run(self) {
        use fv_core::Clock;
        let Some(url) = self.config.url.clone() else { return };
        let headers = build_headers(
            &self.default_headers,
            &self.notification.headers,
            &self.service_id,
            self.clock.epoch_ms(),
        );
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let max_attempts = self.config.retries.max(1);
        let base_delay = Duration::from_millis(self.config.retry_delay_ms);

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            self.metrics.record_attempt(self.clock.epoch_ms());
            let request = OutboundRequest {
                method: self.notification.method.clone(),
                url: url.clone(),
                headers: headers.clone(),
                body: self.notification.body.clone(),
                timeout,
            };
            let outcome = self.transport.send(request).await;
            let classification = classify(&outcome);

            match classification {
                Classification::Success => {
                    self.metrics.record_success(self.clock.epoch_ms());
                    return;
                }
                Classification::Permanent => {
                    self.metrics.record_failure(self.clock.epoch_ms());
                    return;
                }
                Classification::Retryable => {
                    if attempt >= max_attempts {
                        self.metrics.record_failure(self.clock.epoch_ms());
                        return;
                    }
                    let delay = backoff_delay(base_delay, attempt);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn classify(outcome: &Result<TransportResponse, crate::transport::TransportError>) -> Classification {
    match outcome {
        Ok(resp) if (200..300).contains(&resp.status) => Classification::Success,
        Ok(resp) if (400..500).contains(&resp.status) => Classification::Permanent,
        Ok(_) => Classification::Retryable,
        Err(_) => Classification::Retryable,
    }
}

/// `baseDelay × 2^(k-1)`, capped at `10 × baseDelay` (spec §4.F step 5).
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let cap = base.saturating_mul(10);
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(cap)
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
