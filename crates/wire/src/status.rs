// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `failover.status` response (spec §4.H) aggregating GC, Launcher, Detector,
//! and Relay observability (spec §11's supplemented health surface).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GcStatusView {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherStatusView {
    pub initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialization_failed: Option<String>,
    pub tracked_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectorStatusView {
    pub enabled: bool,
}

/// Mirrors `fv_relay::RelayMetricsSnapshot`; kept as a separate type here so
/// `fv-wire` does not need to depend on `fv-relay` (daemon converts).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RelayMetricsView {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
    pub in_flight: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_request_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_success_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailoverStatusResponse {
    pub gc: GcStatusView,
    pub launcher: LauncherStatusView,
    pub detector: DetectorStatusView,
    pub relay: RelayMetricsView,
}

/// One entry in `failover.listBackups` (spec §4.H).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupEntry {
    pub session_id: String,
    pub container_id: String,
    pub container_name: String,
}
