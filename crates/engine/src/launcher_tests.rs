// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fv_adapters::FakeContainerRuntime;
use fv_core::FakeClock;
use fv_storage::FakeSessionStore;

fn config() -> LauncherConfig {
    LauncherConfig {
        image: "openvidu/recording-backup".into(),
        tag: "latest".into(),
        network: "bridge".into(),
        backup_prefix: "recorder-backup".into(),
        controller_host: "localhost".into(),
        controller_port: 8443,
        recording_base_url: Some("https://example.test/recordings".into()),
        security_username: Some("svc".into()),
        security_password: Some("secret".into()),
        heartbeat_period_s: 10,
    }
}

fn setup() -> (Arc<Registry<FakeClock>>, FakeClock, Arc<FakeContainerRuntime>, BackupLauncher<FakeClock>)
{
    let clock = FakeClock::new();
    let registry = Arc::new(Registry::new(Arc::new(FakeSessionStore::new()), clock.clone()));
    let runtime = Arc::new(FakeContainerRuntime::new().with_image("openvidu/recording-backup:latest"));
    let launcher =
        BackupLauncher::new(registry.clone(), clock.clone(), runtime.clone() as Arc<dyn ContainerRuntime>, config());
    (registry, clock, runtime, launcher)
}

#[tokio::test]
async fn launch_creates_and_starts_container_with_next_chunk() {
    let (registry, _clock, runtime, launcher) = setup();
    registry.register("s2", "c1", None, "").expect("register");
    registry.heartbeat("s2", Some("0005.mp4".into())).expect("heartbeat");
    let session = registry.get("s2").expect("present");

    launcher.launch(&session).await.expect("launch");

    assert_eq!(runtime.container_count(), 1);
    let updated = registry.get("s2").expect("present");
    assert!(updated.backup_container_id.is_some());
    assert!(updated.backup_container_name.as_deref().unwrap().starts_with("recorder-backup-s2-"));
    assert_eq!(launcher.tracked_count().await, 1);
    assert!(launcher.is_tracked_async("s2").await);
}

#[tokio::test]
async fn launch_is_refused_when_already_tracked() {
    let (registry, _clock, runtime, launcher) = setup();
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");

    launcher.launch(&session).await.expect("first launch");
    launcher.launch(&session).await.expect("second launch is a no-op");

    assert_eq!(runtime.container_count(), 1);
    assert_eq!(launcher.tracked_count().await, 1);
}

#[tokio::test]
async fn next_chunk_label_parses_digits_and_pads() {
    assert_eq!(BackupLauncher::<FakeClock>::next_chunk_label(Some("0003.mp4")), "0004");
    assert_eq!(BackupLauncher::<FakeClock>::next_chunk_label(Some("0010.mp4")), "0011");
    assert_eq!(BackupLauncher::<FakeClock>::next_chunk_label(None), "0001");
    assert_eq!(BackupLauncher::<FakeClock>::next_chunk_label(Some("not-numeric.mp4")), "0001");
}

#[tokio::test]
async fn launch_fails_fast_once_runtime_unavailable() {
    let (registry, clock, runtime, launcher) = setup();
    runtime.fail_with("docker socket missing");
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");

    let err = launcher.launch(&session).await.expect_err("runtime unavailable");
    assert!(matches!(err, Error::RuntimeUnavailable(_)));

    // Once failed, the state is terminal until restart: a second call does
    // not re-probe the runtime, it just fails fast again.
    clock.advance(std::time::Duration::from_secs(1));
    let err = launcher.launch(&session).await.expect_err("still unavailable");
    assert!(matches!(err, Error::RuntimeUnavailable(_)));
    assert_eq!(launcher.tracked_count().await, 0);
}

#[tokio::test]
async fn stop_backup_grace_stops_force_removes_and_clears_registry() {
    let (registry, _clock, runtime, launcher) = setup();
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");
    launcher.launch(&session).await.expect("launch");

    launcher.stop_backup("s1").await.expect("stop");

    assert_eq!(runtime.container_count(), 0);
    assert_eq!(launcher.tracked_count().await, 0);
    let updated = registry.get("s1").expect("present");
    assert!(updated.backup_container_id.is_none());
    assert!(updated.backup_container_name.is_none());
}

#[tokio::test]
async fn list_tracked_reflects_launch_and_stop() {
    let (registry, _clock, _runtime, launcher) = setup();
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");
    launcher.launch(&session).await.expect("launch");

    let tracked = launcher.list_tracked().await;
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].0, "s1");

    launcher.stop_backup("s1").await.expect("stop");
    assert!(launcher.list_tracked().await.is_empty());
}

#[tokio::test]
async fn stop_backup_unknown_session_is_not_found() {
    let (_registry, _clock, _runtime, launcher) = setup();
    let err = launcher.stop_backup("missing").await.expect_err("not found");
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn reclaim_sweep_drops_tracking_for_stale_sessions() {
    let (registry, _clock, runtime, launcher) = setup();
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");
    launcher.launch(&session).await.expect("launch");

    registry.set_status("s1", fv_core::SessionStatus::Completed).expect("complete");
    launcher.reclaim_sweep().await;

    assert_eq!(launcher.tracked_count().await, 0);
    assert_eq!(runtime.container_count(), 0);
}

#[tokio::test]
async fn reclaim_sweep_keeps_tracking_for_still_active_sessions() {
    let (registry, _clock, _runtime, launcher) = setup();
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");
    launcher.launch(&session).await.expect("launch");

    launcher.reclaim_sweep().await;

    assert_eq!(launcher.tracked_count().await, 1);
}

#[tokio::test]
async fn reconcile_from_runtime_recovers_tracking_after_restart() {
    let (registry, _clock, runtime, launcher) = setup();
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");
    launcher.launch(&session).await.expect("launch");
    assert_eq!(launcher.tracked_count().await, 1);

    // Simulate a restart: a fresh launcher with empty in-memory tracking,
    // same runtime (the "running containers" survive the process restart).
    let restarted =
        BackupLauncher::new(registry.clone(), _clock.clone(), runtime.clone() as Arc<dyn ContainerRuntime>, config());
    assert_eq!(restarted.tracked_count().await, 0);

    restarted.reconcile_from_runtime().await;

    assert_eq!(restarted.tracked_count().await, 1);
    assert!(restarted.is_tracked_async("s1").await);
    let tracked = restarted.list_tracked().await;
    assert_eq!(tracked[0].0, "s1");
}

#[tokio::test]
async fn reconcile_from_runtime_ignores_containers_with_unrelated_names() {
    let (registry, _clock, runtime, launcher) = setup();
    runtime
        .create_container(&ContainerSpec {
            name: "unrelated-container".into(),
            image: "openvidu/recording-backup:latest".into(),
            network: "bridge".into(),
            env: HashMap::new(),
            labels: HashMap::new(),
            shm_bytes: 1,
            memory_bytes: 1,
            cpu_count: 1,
        })
        .await
        .expect("create");

    launcher.reconcile_from_runtime().await;

    assert_eq!(launcher.tracked_count().await, 0);
}

#[tokio::test]
async fn start_backup_trait_impl_swallows_launch_errors() {
    let (registry, _clock, runtime, launcher) = setup();
    runtime.fail_with("boom");
    registry.register("s1", "c1", None, "").expect("register");
    let session = registry.get("s1").expect("present");

    // BackupStarter::start_backup must never panic or propagate; detector
    // ticks continue regardless of launch failures.
    BackupStarter::start_backup(&launcher, &session).await;
    assert_eq!(launcher.tracked_count().await, 0);
}
