// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `failover.status` aggregation (spec §4.H, §11's supplemented health
//! surface): one read across the GC, Launcher, Detector, and Relay.

use crate::bootstrap::ControlPlane;
use fv_core::Clock;
use fv_relay::RelayMetricsSnapshot;
use fv_wire::{DetectorStatusView, FailoverStatusResponse, GcStatusView, LauncherStatusView, RelayMetricsView};

pub async fn aggregate<C: Clock>(plane: &ControlPlane<C>) -> FailoverStatusResponse {
    let (initialized, initialization_failed) = plane.launcher.status().await;

    FailoverStatusResponse {
        gc: GcStatusView { enabled: plane.gc.status().enabled },
        launcher: LauncherStatusView {
            initialized,
            initialization_failed,
            tracked_count: plane.launcher.tracked_count().await,
        },
        detector: DetectorStatusView { enabled: plane.detector.is_enabled() },
        relay: relay_metrics_view(plane.relay.metrics()),
    }
}

/// Shared `fv_relay::RelayMetricsSnapshot` -> `fv_wire::RelayMetricsView`
/// conversion, used by both `failover.status` and `webhook.status`.
pub fn relay_metrics_view(metrics: RelayMetricsSnapshot) -> RelayMetricsView {
    RelayMetricsView {
        total: metrics.total,
        successes: metrics.successes,
        failures: metrics.failures,
        in_flight: metrics.in_flight,
        success_rate: metrics.success_rate(),
        last_request_time: metrics.last_request_ms.map(fv_core::format_timestamp),
        last_success_time: metrics.last_success_ms.map(fv_core::format_timestamp),
        last_failure_time: metrics.last_failure_ms.map(fv_core::format_timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::wire;
    use fv_adapters::{FakeContainerRuntime, FakeObjectStore};
    use fv_core::{Config, FakeClock};
    use fv_relay::FakeTransport;
    use fv_storage::FakeSessionStore;
    use std::sync::Arc;

    fn minimal_config() -> Config {
        Config::from_toml_str("[object_store]\nbucket = \"recordings\"\n").expect("parses")
    }

    #[tokio::test]
    async fn aggregate_reflects_freshly_wired_components() {
        let plane = wire(
            minimal_config(),
            FakeClock::new(),
            Arc::new(FakeSessionStore::new()),
            Arc::new(FakeObjectStore::new()),
            Arc::new(FakeContainerRuntime::new()),
            Arc::new(FakeTransport::new()),
        )
        .await;

        let status = aggregate(&plane).await;
        assert!(status.gc.enabled);
        assert!(status.detector.enabled);
        assert!(!status.launcher.initialized);
        assert_eq!(status.launcher.tracked_count, 0);
        assert_eq!(status.relay.total, 0);
        assert_eq!(status.relay.success_rate, None);
    }
}
