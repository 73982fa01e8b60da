// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration surface (spec §6's recognized-options table).
//!
//! Loaded from TOML at process bootstrap (out of scope for the core per
//! spec §1; `fv-daemon` owns locating the file). Every field has a default
//! so a minimal or empty config file still produces a runnable control plane.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_heartbeat_period_s() -> u64 {
    10
}
fn default_chunk_period_s() -> u64 {
    10
}
fn default_max_missed() -> u32 {
    3
}
fn default_check_interval_s() -> u64 {
    15
}
fn default_cleanup_interval_s() -> u64 {
    60
}
fn default_max_inactive_s() -> u64 {
    300
}
fn default_true() -> bool {
    true
}
fn default_image() -> String {
    "openvidu/recording-backup".to_string()
}
fn default_tag() -> String {
    "latest".to_string()
}
fn default_network() -> String {
    "bridge".to_string()
}
fn default_backup_prefix() -> String {
    "recorder-backup".to_string()
}
fn default_socket_path() -> String {
    "/var/run/docker.sock".to_string()
}
fn default_chunk_folder() -> String {
    "chunks".to_string()
}
fn default_batch_size() -> usize {
    1000
}
fn default_relay_timeout_ms() -> u64 {
    5_000
}
fn default_relay_retries() -> u32 {
    3
}
fn default_relay_retry_delay_ms() -> u64 {
    500
}
fn default_relay_pool_core() -> usize {
    2
}
fn default_relay_pool_max() -> usize {
    8
}
fn default_relay_pool_queue() -> usize {
    256
}

/// Object store configuration (spec §6, S3-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_chunk_folder")]
    pub chunk_folder: String,
}

/// Chunk garbage collection controls (spec §6 `cleanup.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub r#async: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { enabled: true, r#async: true, batch_size: default_batch_size() }
    }
}

/// Notification relay configuration (spec §6 `relay.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub url: Option<String>,
    /// Raw `"K1:V1,K2:V2"` default-header list, as spec §4.F specifies it.
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default = "default_relay_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_relay_retries")]
    pub retries: u32,
    #[serde(default = "default_relay_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_relay_pool_core")]
    pub pool_core: usize,
    #[serde(default = "default_relay_pool_max")]
    pub pool_max: usize,
    #[serde(default = "default_relay_pool_queue")]
    pub pool_queue: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: None,
            headers: None,
            timeout_ms: default_relay_timeout_ms(),
            retries: default_relay_retries(),
            retry_delay_ms: default_relay_retry_delay_ms(),
            enabled: true,
            pool_core: default_relay_pool_core(),
            pool_max: default_relay_pool_max(),
            pool_queue: default_relay_pool_queue(),
        }
    }
}

fn default_controller_host() -> String {
    "localhost".to_string()
}
fn default_controller_port() -> u16 {
    8443
}

/// Fields forwarded into a backup recorder's environment (spec §4.E) that
/// aren't part of spec §6's enumerated configuration table but are still
/// ambient process configuration the daemon must supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEnvConfig {
    #[serde(default = "default_controller_host")]
    pub controller_host: String,
    #[serde(default = "default_controller_port")]
    pub controller_port: u16,
    #[serde(default)]
    pub recording_base_url: Option<String>,
    #[serde(default)]
    pub security_username: Option<String>,
    #[serde(default)]
    pub security_password: Option<String>,
}

impl Default for BackupEnvConfig {
    fn default() -> Self {
        Self {
            controller_host: default_controller_host(),
            controller_port: default_controller_port(),
            recording_base_url: None,
            security_username: None,
            security_password: None,
        }
    }
}

/// Container runtime configuration (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_backup_prefix")]
    pub backup_prefix: String,
    #[serde(default = "default_socket_path")]
    pub socket_path: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            tag: default_tag(),
            network: default_network(),
            backup_prefix: default_backup_prefix(),
            socket_path: default_socket_path(),
        }
    }
}

/// Top-level control plane configuration (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_heartbeat_period_s")]
    pub heartbeat_period_s: u64,
    #[serde(default = "default_chunk_period_s")]
    pub chunk_period_s: u64,
    #[serde(default = "default_max_missed")]
    pub max_missed: u32,
    #[serde(default = "default_check_interval_s")]
    pub check_interval_s: u64,
    #[serde(default = "default_cleanup_interval_s")]
    pub cleanup_interval_s: u64,
    #[serde(default = "default_max_inactive_s")]
    pub max_inactive_s: u64,
    #[serde(default = "default_true")]
    pub failover_enabled: bool,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    pub object_store: ObjectStoreConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub backup_env: BackupEnvConfig,
}

impl Config {
    /// Parse from a TOML document (the same surface the teacher's own config
    /// layer uses the `toml` crate for).
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// `HB_TIMEOUT = heartbeatPeriod × maxMissed` (spec §4.D).
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_period_s * self.max_missed as u64)
    }

    /// `STUCK_TIMEOUT = chunkPeriod × maxMissed` (spec §4.D).
    pub fn stuck_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_period_s * self.max_missed as u64)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_s)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_s)
    }

    pub fn max_inactive(&self) -> Duration {
        Duration::from_secs(self.max_inactive_s)
    }

    /// Normalized chunk-folder prefix: strip leading/trailing `/` (spec §4.C).
    pub fn chunk_folder(&self) -> &str {
        self.object_store.chunk_folder.trim_matches('/')
    }
}
