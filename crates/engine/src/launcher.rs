// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup Launcher: lazy-initialized container-runtime client that creates,
//! starts, and stops backup workers for failed sessions (spec §4.E).

use crate::detector::BackupStarter;
use crate::registry::Registry;
use fv_adapters::{ContainerRuntime, ContainerSpec};
use fv_core::{Clock, Error, Result, Session};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

const SHM_BYTES: i64 = 2 * 1024 * 1024 * 1024;
const MEMORY_BYTES: i64 = 4 * 1024 * 1024 * 1024;
const CPU_COUNT: i64 = 2;
const STOP_GRACE_SECS: u32 = 30;

/// Image + network coordinates and env-composition inputs (spec §4.E, §6).
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub image: String,
    pub tag: String,
    pub network: String,
    pub backup_prefix: String,
    pub controller_host: String,
    pub controller_port: u16,
    pub recording_base_url: Option<String>,
    pub security_username: Option<String>,
    pub security_password: Option<String>,
    pub heartbeat_period_s: u64,
}

impl LauncherConfig {
    fn image_ref(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }
}

enum RuntimeState {
    Uninitialized,
    Ready(Arc<dyn ContainerRuntime>),
    Failed(String),
}

/// In-memory record of a backup container the launcher is tracking for a session.
#[derive(Debug, Clone)]
struct Tracked {
    container_id: String,
    container_name: String,
}

pub struct BackupLauncher<C: Clock> {
    registry: Arc<Registry<C>>,
    clock: C,
    runtime: Arc<dyn ContainerRuntime>,
    state: AsyncMutex<RuntimeState>,
    tracking: AsyncMutex<HashMap<String, Tracked>>,
    config: LauncherConfig,
}

impl<C: Clock> BackupLauncher<C> {
    pub fn new(
        registry: Arc<Registry<C>>,
        clock: C,
        runtime: Arc<dyn ContainerRuntime>,
        config: LauncherConfig,
    ) -> Self {
        Self {
            registry,
            clock,
            runtime,
            state: AsyncMutex::new(RuntimeState::Uninitialized),
            tracking: AsyncMutex::new(HashMap::new()),
            config,
        }
    }

    /// `{initialized, initializationFailed}` status for `failover.status` (spec §4.E).
    pub async fn status(&self) -> (bool, Option<String>) {
        match &*self.state.lock().await {
            RuntimeState::Ready(_) => (true, None),
            RuntimeState::Uninitialized => (false, None),
            RuntimeState::Failed(msg) => (false, Some(msg.clone())),
        }
    }

    pub async fn tracked_count(&self) -> usize {
        self.tracking.lock().await.len()
    }

    pub async fn is_tracked_async(&self, session_id: &str) -> bool {
        self.tracking.lock().await.contains_key(session_id)
    }

    /// `failover.listBackups` (spec §4.H): every currently tracked backup.
    pub async fn list_tracked(&self) -> Vec<(String, String, String)> {
        self.tracking
            .lock()
            .await
            .iter()
            .map(|(session_id, t)| (session_id.clone(), t.container_id.clone(), t.container_name.clone()))
            .collect()
    }

    /// Validate (and, on first success, prepare the image for) the runtime
    /// client. Subsequent calls reuse the recorded outcome: once failed,
    /// every later call fails fast until process restart (spec §4.E).
    async fn ensure_runtime(&self) -> Result<Arc<dyn ContainerRuntime>> {
        let mut state = self.state.lock().await;
        match &*state {
            RuntimeState::Ready(rt) => return Ok(rt.clone()),
            RuntimeState::Failed(msg) => return Err(Error::RuntimeUnavailable(msg.clone())),
            RuntimeState::Uninitialized => {}
        }
        match self.runtime.ping().await {
            Ok(()) => {
                *state = RuntimeState::Ready(self.runtime.clone());
                self.spawn_image_prep();
                Ok(self.runtime.clone())
            }
            Err(e) => {
                let msg = e.to_string();
                *state = RuntimeState::Failed(msg.clone());
                Err(Error::RuntimeUnavailable(msg))
            }
        }
    }

    /// Background image pull, started once the runtime client is ready
    /// (spec §4.E: "Image preparation"). Pull failures are non-fatal.
    fn spawn_image_prep(&self) {
        let runtime = self.runtime.clone();
        let image = self.config.image.clone();
        let tag = self.config.tag.clone();
        let image_ref = self.config.image_ref();
        tokio::spawn(async move {
            match runtime.image_exists(&image_ref).await {
                Ok(true) => {}
                Ok(false) => {
                    if let Err(e) = runtime.pull_image(&image, &tag).await {
                        tracing::warn!(error = %e, image = %image_ref, "backup image pull failed");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, image = %image_ref, "backup image inspect failed");
                }
            }
        });
    }

    /// Parse the numeric chunk index out of `lastChunk` (e.g. `"0003.mp4" -> 3`)
    /// and return the next chunk label, zero-padded to 4 digits (spec §4.E step 2).
    fn next_chunk_label(last_chunk: Option<&str>) -> String {
        let digits: Option<u32> = last_chunk.and_then(|s| {
            let numeric: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
            numeric.parse().ok()
        });
        match digits {
            Some(n) => format!("{:04}", n + 1),
            None => "0001".to_string(),
        }
    }

    fn build_env(&self, session: &Session, start_chunk: &str) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("VIDEO_ID".to_string(), session.id.as_str().to_string());
        env.insert("VIDEO_NAME".to_string(), session.id.as_str().to_string());
        env.insert("SESSION_ID".to_string(), session.id.as_str().to_string());
        env.insert("START_CHUNK".to_string(), start_chunk.to_string());
        env.insert("CLIENT_ID".to_string(), format!("{}-backup", session.client_id));
        env.insert("HEARTBEAT_INTERVAL".to_string(), self.config.heartbeat_period_s.to_string());
        env.insert("IS_BACKUP_CONTAINER".to_string(), "true".to_string());
        env.insert("CONTROLLER_HOST".to_string(), self.config.controller_host.clone());
        env.insert("CONTROLLER_PORT".to_string(), self.config.controller_port.to_string());
        if let Some(url) = &self.config.recording_base_url {
            env.insert("RECORDING_BASE_URL".to_string(), url.clone());
        }
        if let Some(user) = &self.config.security_username {
            env.insert("APP_SECURITY_USERNAME".to_string(), user.clone());
        }
        if let Some(pass) = &self.config.security_password {
            env.insert("APP_SECURITY_PASSWORD".to_string(), pass.clone());
        }
        if let Some(host) = &session.client_host {
            env.insert("ORIGINAL_CLIENT_HOST".to_string(), host.clone());
        }
        env.insert("RECORDING_JSON".to_string(), session.metadata.clone());
        if let Some(path) = &session.recording_path {
            env.insert("RECORDING_PATH".to_string(), path.clone());
        }
        env
    }

    /// Launch algorithm for session `R` (spec §4.E).
    pub async fn launch(&self, session: &Session) -> Result<()> {
        {
            let tracking = self.tracking.lock().await;
            if tracking.contains_key(session.id.as_str()) {
                return Ok(());
            }
        }

        let runtime = self.ensure_runtime().await?;

        let start_chunk = Self::next_chunk_label(session.last_chunk.as_deref());
        let now_ms = self.clock.epoch_ms();
        let name = format!("{}-{}-{}", self.config.backup_prefix, session.id, now_ms);

        let mut labels = HashMap::new();
        labels.insert("session.id".to_string(), session.id.as_str().to_string());
        labels.insert("container.type".to_string(), "backup-recorder".to_string());
        labels.insert("created.by".to_string(), "failover-control-plane".to_string());
        labels.insert("start.chunk".to_string(), start_chunk.clone());

        let spec = ContainerSpec {
            name: name.clone(),
            image: self.config.image_ref(),
            network: self.config.network.clone(),
            env: self.build_env(session, &start_chunk),
            labels,
            shm_bytes: SHM_BYTES,
            memory_bytes: MEMORY_BYTES,
            cpu_count: CPU_COUNT,
        };

        let container_id = runtime.create_container(&spec).await?;
        runtime.start_container(&container_id).await?;

        self.registry.set_backup_container(session.id.as_str(), container_id.clone(), name.clone())?;

        self.tracking
            .lock()
            .await
            .insert(session.id.as_str().to_string(), Tracked { container_id, container_name: name });
        Ok(())
    }

    /// Stop algorithm (spec §4.E): grace stop, force-remove, clear registry
    /// fields, drop tracking entry. Absence from the map is `NotFound`.
    pub async fn stop_backup(&self, session_id: &str) -> Result<()> {
        let tracked = {
            let mut tracking = self.tracking.lock().await;
            tracking.remove(session_id).ok_or_else(|| Error::NotFound(session_id.to_string()))?
        };

        let runtime = self.runtime.clone();
        if let Err(e) = runtime.stop_container(&tracked.container_id, STOP_GRACE_SECS).await {
            tracing::warn!(error = %e, container = %tracked.container_id, "backup stop failed, forcing removal");
        }
        runtime.remove_container(&tracked.container_id).await?;
        self.registry.clear_backup_container(session_id)?;
        Ok(())
    }

    /// Cleanup sweep (spec §4.E): drop tracking entries for sessions whose
    /// registry record is missing or no longer active, stopping their
    /// containers best-effort.
    pub async fn reclaim_sweep(&self) {
        let stale: Vec<String> = {
            let tracking = self.tracking.lock().await;
            tracking
                .keys()
                .filter(|id| match self.registry.get(id) {
                    Some(s) => !s.is_active(),
                    None => true,
                })
                .cloned()
                .collect()
        };
        for id in stale {
            if let Err(e) = self.stop_backup(&id).await {
                tracing::warn!(error = %e, session = %id, "backup reclaim sweep failed");
            }
        }
    }

    /// Reconcile the tracking map against containers the runtime already
    /// knows about, labelled `container.type=backup-recorder`. Runs once at
    /// startup in case the control plane restarted without a graceful
    /// shutdown and lost its in-memory tracking state.
    pub async fn reconcile_from_runtime(&self) {
        let runtime = match self.ensure_runtime().await {
            Ok(rt) => rt,
            Err(e) => {
                tracing::warn!(error = %e, "skipping backup reconciliation: runtime unavailable");
                return;
            }
        };
        let containers = match runtime.list_containers_by_label("container.type=backup-recorder").await
        {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "backup reconciliation list failed");
                return;
            }
        };
        let mut tracking = self.tracking.lock().await;
        for (container_id, container_name) in containers {
            if let Some(session_id) = container_name
                .strip_prefix(&format!("{}-", self.config.backup_prefix))
                .and_then(|rest| rest.rsplit_once('-'))
                .map(|(id, _ms)| id.to_string())
            {
                tracking.entry(session_id).or_insert(Tracked { container_id, container_name });
            }
        }
    }
}

#[async_trait::async_trait]
impl<C: Clock> BackupStarter for BackupLauncher<C> {
    fn is_tracked(&self, session_id: &str) -> bool {
        self.tracking.try_lock().map(|t| t.contains_key(session_id)).unwrap_or(true)
    }

    async fn start_backup(&self, session: &Session) {
        if let Err(e) = self.launch(session).await {
            tracing::warn!(error = %e, session = %session.id, "backup launch failed");
        }
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
