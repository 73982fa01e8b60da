// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process bootstrap: wires the Store, Registry, GC, Detector, Launcher, and
//! Relay into the component graph spec §2 describes, starts the Scheduler,
//! and owns the cooperative shutdown sequence (spec §5).

use fv_adapters::{ContainerRuntime, DockerRuntime, ObjectStore, S3ObjectStore};
use fv_core::{Clock, Config, SystemClock};
use fv_engine::{BackupLauncher, ChunkGc, LauncherConfig, LivenessDetector, Registry, Scheduler};
use fv_relay::{HttpTransport, NotificationRelay, ReqwestTransport};
use fv_storage::{SessionStore, WalSessionStore};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::webhook::RegistryStopHook;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to create state directory {path}: {source}")]
    StateDir { path: PathBuf, source: std::io::Error },
    #[error("another failoverd instance is already running (lock held on {path})")]
    LockHeld { path: PathBuf },
    #[error(transparent)]
    Storage(#[from] fv_storage::StorageError),
}

/// The fully wired control plane. Holds every component a caller of the
/// Registry-facing API surface (spec §4.H) dispatches into, plus the
/// scheduler's shutdown handle. Generic over [`Clock`] so tests can wire the
/// same graph against a [`fv_core::FakeClock`] without touching the network.
pub struct ControlPlane<C: Clock = SystemClock> {
    pub registry: Arc<Registry<C>>,
    pub gc: Arc<ChunkGc>,
    pub detector: Arc<LivenessDetector<C>>,
    pub launcher: Arc<BackupLauncher<C>>,
    pub relay: Arc<NotificationRelay>,
    pub config: Config,
    shutdown: CancellationToken,
    _lock_file: Option<File>,
}

impl ControlPlane<SystemClock> {
    /// Build every real adapter (WAL store, S3 object store, Docker Engine
    /// API client, reqwest transport), acquire the single-instance lock, and
    /// wire the component graph.
    pub async fn start(config: Config, state_dir: &Path) -> Result<Self, StartupError> {
        std::fs::create_dir_all(state_dir)
            .map_err(|source| StartupError::StateDir { path: state_dir.to_path_buf(), source })?;
        let lock_file = acquire_lock(state_dir)?;

        let store: Arc<dyn SessionStore> = Arc::new(WalSessionStore::open(state_dir.join("sessions"))?);
        let object_store: Arc<dyn ObjectStore> = Arc::new(build_object_store(&config).await);
        let runtime: Arc<dyn ContainerRuntime> = Arc::new(DockerRuntime::new(&config.runtime.socket_path));
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());

        let mut plane = wire(config, SystemClock, store, object_store, runtime, transport).await;
        plane._lock_file = Some(lock_file);
        Ok(plane)
    }
}

/// Wire the component graph against already-constructed adapters (spec §2's
/// data-flow diagram). Kept free of any concrete adapter type so it is
/// equally reachable from production startup and from component-wiring
/// tests using the `fv-adapters`/`fv-relay` fakes.
pub async fn wire<C: Clock>(
    config: Config,
    clock: C,
    store: Arc<dyn SessionStore>,
    object_store: Arc<dyn ObjectStore>,
    runtime: Arc<dyn ContainerRuntime>,
    transport: Arc<dyn HttpTransport>,
) -> ControlPlane<C> {
    let gc = Arc::new(ChunkGc::new(
        object_store,
        config.chunk_folder(),
        config.cleanup.batch_size,
        config.cleanup.r#async,
    ));
    if config.cleanup.enabled {
        gc.validate_startup().await;
    } else {
        gc.disable();
    }

    let registry = Arc::new(Registry::new(store, clock.clone()).with_removal_hook(gc.clone()));

    let launcher_config = LauncherConfig {
        image: config.runtime.image.clone(),
        tag: config.runtime.tag.clone(),
        network: config.runtime.network.clone(),
        backup_prefix: config.runtime.backup_prefix.clone(),
        controller_host: config.backup_env.controller_host.clone(),
        controller_port: config.backup_env.controller_port,
        recording_base_url: config.backup_env.recording_base_url.clone(),
        security_username: config.backup_env.security_username.clone(),
        security_password: config.backup_env.security_password.clone(),
        heartbeat_period_s: config.heartbeat_period_s,
    };
    let launcher = Arc::new(BackupLauncher::new(registry.clone(), clock.clone(), runtime, launcher_config));
    launcher.reconcile_from_runtime().await;

    let detector = Arc::new(LivenessDetector::new(
        registry.clone(),
        launcher.clone(),
        clock.clone(),
        config.heartbeat_timeout(),
        config.stuck_timeout(),
    ));
    if !config.failover_enabled {
        detector.set_enabled(false);
    }

    let relay = Arc::new(
        NotificationRelay::new(config.relay.clone(), "failoverd", transport)
            .with_stop_hook(Arc::new(RegistryStopHook::new(registry.clone()))),
    );

    ControlPlane {
        registry,
        gc,
        detector,
        launcher,
        relay,
        config,
        shutdown: CancellationToken::new(),
        _lock_file: None,
    }
}

impl<C: Clock + 'static> ControlPlane<C> {
    /// Arm the three scheduler jobs (spec §4.G) and run until shutdown is
    /// requested. Returns once the scheduler has stopped arming new ticks;
    /// in-flight ticks are left to finish on their own.
    pub async fn run_scheduler(&self) {
        let mut scheduler = Scheduler::new();

        let detector = self.detector.clone();
        scheduler.add_job(
            fv_engine::DETECT,
            self.config.check_interval(),
            Duration::from_secs(2),
            move || {
                let detector = detector.clone();
                async move {
                    detector.tick().await;
                }
            },
        );

        let registry = self.registry.clone();
        let max_inactive = self.config.max_inactive();
        scheduler.add_job(fv_engine::CLEANUP, self.config.cleanup_interval(), Duration::from_secs(5), move || {
            let registry = registry.clone();
            async move {
                if let Err(e) = registry.sweep_inactive(max_inactive) {
                    tracing::warn!(error = %e, "inactivity sweep failed");
                }
            }
        });

        let launcher = self.launcher.clone();
        scheduler.add_job(
            fv_engine::BACKUP_RECLAIM,
            self.config.cleanup_interval(),
            Duration::from_secs(5),
            move || {
                let launcher = launcher.clone();
                async move {
                    launcher.reclaim_sweep().await;
                }
            },
        );

        scheduler.run(self.shutdown.clone()).await;
    }

    /// Cooperative shutdown (spec §5): stop arming new scheduler ticks and
    /// drain the relay pool within a bounded grace window.
    pub async fn shutdown(&self, grace: Duration) {
        self.shutdown.cancel();
        if !self.relay.drain(grace).await {
            tracing::warn!("relay pool did not drain within the shutdown grace window");
        }
    }
}

async fn build_object_store(config: &Config) -> S3ObjectStore {
    let client = S3ObjectStore::from_config(
        config.object_store.region.clone(),
        config.object_store.endpoint.clone(),
    )
    .await;
    client.with_bucket(config.object_store.bucket.clone())
}

/// Exclusive lock over `{state_dir}/failoverd.lock`, held for the process
/// lifetime: a single control-plane instance is assumed (spec §1 non-goal).
fn acquire_lock(state_dir: &Path) -> Result<File, StartupError> {
    use fs2::FileExt;
    let path = state_dir.join("failoverd.lock");
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|source| StartupError::StateDir { path: path.clone(), source })?;
    file.try_lock_exclusive().map_err(|_| StartupError::LockHeld { path })?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fv_adapters::{FakeContainerRuntime, FakeObjectStore};
    use fv_core::FakeClock;
    use fv_relay::FakeTransport;
    use fv_storage::FakeSessionStore;

    fn minimal_config() -> Config {
        Config::from_toml_str("[object_store]\nbucket = \"recordings\"\n").expect("parses")
    }

    #[tokio::test]
    async fn wire_enables_gc_when_bucket_present() {
        let plane = wire(
            minimal_config(),
            FakeClock::new(),
            Arc::new(FakeSessionStore::new()),
            Arc::new(FakeObjectStore::new()),
            Arc::new(FakeContainerRuntime::new()),
            Arc::new(FakeTransport::new()),
        )
        .await;
        assert!(plane.gc.status().enabled);
        assert_eq!(plane.registry.count_all(), 0);
    }

    #[tokio::test]
    async fn wire_disables_gc_when_bucket_missing() {
        let object_store = Arc::new(FakeObjectStore::new());
        object_store.mark_bucket_missing();
        let plane = wire(
            minimal_config(),
            FakeClock::new(),
            Arc::new(FakeSessionStore::new()),
            object_store,
            Arc::new(FakeContainerRuntime::new()),
            Arc::new(FakeTransport::new()),
        )
        .await;
        assert!(!plane.gc.status().enabled);
    }

    #[tokio::test]
    async fn wire_disables_gc_when_cleanup_is_configured_off() {
        let mut config = minimal_config();
        config.cleanup.enabled = false;
        let plane = wire(
            config,
            FakeClock::new(),
            Arc::new(FakeSessionStore::new()),
            Arc::new(FakeObjectStore::new()),
            Arc::new(FakeContainerRuntime::new()),
            Arc::new(FakeTransport::new()),
        )
        .await;
        assert!(!plane.gc.status().enabled);
    }

    #[tokio::test]
    async fn wire_disables_detector_when_failover_is_configured_off() {
        let mut config = minimal_config();
        config.failover_enabled = false;
        let plane = wire(
            config,
            FakeClock::new(),
            Arc::new(FakeSessionStore::new()),
            Arc::new(FakeObjectStore::new()),
            Arc::new(FakeContainerRuntime::new()),
            Arc::new(FakeTransport::new()),
        )
        .await;
        assert!(!plane.detector.is_enabled());
    }

    #[test]
    fn acquire_lock_refuses_a_second_holder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let _first = acquire_lock(dir.path()).expect("first lock");
        let err = acquire_lock(dir.path()).expect_err("second lock");
        assert!(matches!(err, StartupError::LockHeld { .. }));
    }
}
