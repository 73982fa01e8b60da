// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime seam: launching and stopping backup recorder containers
//! (spec §4.E, §6).

use async_trait::async_trait;
use fv_core::Result;
use std::collections::HashMap;

/// Parameters for creating a backup recorder container (spec §4.E step 5).
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub network: String,
    pub env: HashMap<String, String>,
    pub labels: HashMap<String, String>,
    /// Shared-memory cap in bytes (spec: 2 GiB).
    pub shm_bytes: i64,
    /// Memory cap in bytes (spec: 4 GiB).
    pub memory_bytes: i64,
    /// CPU count cap (spec: 2).
    pub cpu_count: i64,
}

/// The subset of the Docker Engine API the launcher needs (spec §6:
/// ping, inspectImage, pullImage, createContainer, startContainer,
/// stopContainer, removeContainer).
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// `GET /_ping` — used to validate the runtime client at lazy-init time.
    async fn ping(&self) -> Result<()>;

    /// `GET /images/{name}/json` — returns `Ok(true)` iff the image is present locally.
    async fn image_exists(&self, image: &str) -> Result<bool>;

    /// `POST /images/create?fromImage=...&tag=...`
    async fn pull_image(&self, image: &str, tag: &str) -> Result<()>;

    /// `POST /containers/create?name=...` — returns the created container id.
    async fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// `POST /containers/{id}/start`
    async fn start_container(&self, id: &str) -> Result<()>;

    /// `POST /containers/{id}/stop?t={grace_secs}`
    async fn stop_container(&self, id: &str, grace_secs: u32) -> Result<()>;

    /// `DELETE /containers/{id}`
    async fn remove_container(&self, id: &str) -> Result<()>;

    /// `GET /containers/json?filters={"label":["..."]}` — used at startup to
    /// reconcile the launcher's tracking map against containers the runtime
    /// already knows about (labelled by session id), in case the control
    /// plane restarted without a graceful shutdown.
    async fn list_containers_by_label(&self, label: &str) -> Result<Vec<(String, String)>>;
}
