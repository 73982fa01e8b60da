// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fake::{FakeTransport, ScriptedResponse};
use parking_lot::Mutex;

fn config() -> RelayConfig {
    RelayConfig {
        url: Some("https://relay.example/notify".to_string()),
        headers: Some("K1:V1".to_string()),
        timeout_ms: 1_000,
        retries: 3,
        retry_delay_ms: 1,
        enabled: true,
        pool_core: 1,
        pool_max: 4,
        pool_queue: 4,
    }
}

fn task(transport: Arc<FakeTransport>, config: RelayConfig) -> DeliveryTask {
    DeliveryTask {
        config,
        service_id: "relay-test".to_string(),
        transport,
        metrics: Arc::new(RelayMetrics::new()),
        default_headers: HashMap::new(),
        clock: fv_core::SystemClock,
        notification: InboundNotification {
            method: "POST".to_string(),
            headers: vec![],
            body: Some(r#"{"id":"s1"}"#.to_string()),
        },
    }
}

#[tokio::test]
async fn successful_first_attempt_records_success_once() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(200));
    let t = task(transport.clone(), config());
    let metrics = t.metrics.clone();
    t.run().await;
    assert_eq!(transport.request_count(), 1);
    let snap = metrics.snapshot();
    assert_eq!(snap.successes, 1);
    assert_eq!(snap.failures, 0);
}

#[tokio::test]
async fn permanent_4xx_is_not_retried() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(404));
    let t = task(transport.clone(), config());
    let metrics = t.metrics.clone();
    t.run().await;
    assert_eq!(transport.request_count(), 1);
    assert_eq!(metrics.snapshot().failures, 1);
}

#[tokio::test]
async fn retries_503_then_succeeds_on_third_attempt() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(503));
    transport.push(ScriptedResponse::Status(503));
    transport.push(ScriptedResponse::Status(200));
    let t = task(transport.clone(), config());
    let metrics = t.metrics.clone();
    t.run().await;
    assert_eq!(transport.request_count(), 3);
    let snap = metrics.snapshot();
    assert_eq!(snap.successes, 1);
    assert_eq!(snap.failures, 0);
}

#[tokio::test]
async fn exhausting_retries_records_one_failure() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(503));
    let mut cfg = config();
    cfg.retries = 3;
    let t = task(transport.clone(), cfg);
    let metrics = t.metrics.clone();
    t.run().await;
    assert_eq!(transport.request_count(), 3);
    assert_eq!(metrics.snapshot().failures, 1);
}

#[tokio::test]
async fn transport_error_classifies_as_retryable() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Error);
    let mut cfg = config();
    cfg.retries = 2;
    let t = task(transport.clone(), cfg);
    let metrics = t.metrics.clone();
    t.run().await;
    assert_eq!(transport.request_count(), 2);
    assert_eq!(metrics.snapshot().failures, 1);
}

#[test]
fn backoff_doubles_each_attempt_capped_at_ten_times_base() {
    let base = Duration::from_millis(10);
    assert_eq!(backoff_delay(base, 1), Duration::from_millis(10));
    assert_eq!(backoff_delay(base, 2), Duration::from_millis(20));
    assert_eq!(backoff_delay(base, 3), Duration::from_millis(40));
    assert_eq!(backoff_delay(base, 10), Duration::from_millis(100));
}

struct RecordingStopHook {
    calls: Mutex<Vec<String>>,
    known: Vec<String>,
}

impl SessionStopHook for RecordingStopHook {
    fn mark_stopping(&self, session_id: &str) -> bool {
        self.calls.lock().push(session_id.to_string());
        self.known.contains(&session_id.to_string())
    }
}

fn relay_with_hook(hook: Arc<RecordingStopHook>) -> (NotificationRelay, Arc<FakeTransport>) {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(200));
    let relay =
        NotificationRelay::new(config(), "relay-svc", transport.clone() as Arc<dyn HttpTransport>)
            .with_stop_hook(hook);
    (relay, transport)
}

#[tokio::test]
async fn terminal_status_shortcut_marks_known_session_stopping() {
    let hook = Arc::new(RecordingStopHook { calls: Mutex::new(vec![]), known: vec!["s4".into()] });
    let (relay, _transport) = relay_with_hook(hook.clone());

    let ack = relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s4","status":"stopped"}"#.to_string()),
    });

    assert_eq!(ack, RelayAck::Scheduled);
    assert_eq!(hook.calls.lock().as_slice(), ["s4".to_string()]);
}

#[tokio::test]
async fn terminal_status_shortcut_ignores_non_terminal_status() {
    let hook = Arc::new(RecordingStopHook { calls: Mutex::new(vec![]), known: vec!["s4".into()] });
    let (relay, _transport) = relay_with_hook(hook.clone());

    relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s4","status":"recording"}"#.to_string()),
    });

    assert!(hook.calls.lock().is_empty());
}

#[tokio::test]
async fn terminal_status_shortcut_is_fire_and_forget_for_unknown_session() {
    let hook = Arc::new(RecordingStopHook { calls: Mutex::new(vec![]), known: vec![] });
    let (relay, _transport) = relay_with_hook(hook.clone());

    // Unknown session: hook is still invoked (and returns false), but the
    // inbound call itself does not fail.
    let ack = relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"ghost","status":"stopped"}"#.to_string()),
    });

    assert_eq!(ack, RelayAck::Scheduled);
    assert_eq!(hook.calls.lock().as_slice(), ["ghost".to_string()]);
}

#[tokio::test]
async fn disabled_relay_skips_scheduling_but_still_runs_shortcut() {
    let hook = Arc::new(RecordingStopHook { calls: Mutex::new(vec![]), known: vec!["s4".into()] });
    let mut cfg = config();
    cfg.enabled = false;
    let transport = Arc::new(FakeTransport::new());
    let relay =
        NotificationRelay::new(cfg, "relay-svc", transport.clone() as Arc<dyn HttpTransport>)
            .with_stop_hook(hook.clone());

    let ack = relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s4","status":"stopped"}"#.to_string()),
    });

    assert_eq!(ack, RelayAck::Disabled);
    assert_eq!(hook.calls.lock().as_slice(), ["s4".to_string()]);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn no_url_configured_is_treated_as_disabled() {
    let mut cfg = config();
    cfg.url = None;
    let transport = Arc::new(FakeTransport::new());
    let relay = NotificationRelay::new(cfg, "relay-svc", transport.clone() as Arc<dyn HttpTransport>);

    let ack = relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s4","status":"recording"}"#.to_string()),
    });

    assert_eq!(ack, RelayAck::Disabled);
}

#[tokio::test]
async fn bare_get_without_payload_is_a_health_probe() {
    let transport = Arc::new(FakeTransport::new());
    let relay = NotificationRelay::new(config(), "relay-svc", transport.clone() as Arc<dyn HttpTransport>);

    let ack = relay.receive(InboundNotification { method: "GET".to_string(), headers: vec![], body: None });

    assert_eq!(ack, RelayAck::HealthProbe);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn scheduled_delivery_eventually_reaches_transport() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(200));
    let relay = NotificationRelay::new(config(), "relay-svc", transport.clone() as Arc<dyn HttpTransport>);

    relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s1","status":"recording"}"#.to_string()),
    });

    // Delivery is scheduled on a spawned task; give it a turn to run.
    for _ in 0..50 {
        if transport.request_count() > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(transport.request_count(), 1);
    assert_eq!(relay.metrics().successes, 1);
}

#[tokio::test]
async fn drain_returns_true_once_in_flight_deliveries_settle() {
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(200));
    let relay = NotificationRelay::new(config(), "relay-svc", transport.clone() as Arc<dyn HttpTransport>);

    relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s1","status":"recording"}"#.to_string()),
    });

    assert!(relay.drain(Duration::from_secs(1)).await);
    assert_eq!(relay.metrics().in_flight, 0);
}

#[tokio::test]
async fn drain_times_out_while_pool_is_saturated() {
    let mut cfg = config();
    cfg.pool_max = 1;
    cfg.retries = 5;
    cfg.retry_delay_ms = 200;
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Error);
    let relay = NotificationRelay::new(cfg, "relay-svc", transport.clone() as Arc<dyn HttpTransport>);

    relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: Some(r#"{"id":"s1","status":"recording"}"#.to_string()),
    });
    // Give the delivery task a turn to actually acquire its permit and start
    // its first (failing) attempt before we race it with a short drain.
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!relay.drain(Duration::from_millis(50)).await);
}

// Requires a multi-thread runtime: the saturated branch uses
// `tokio::task::block_in_place`, which panics off one.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn saturated_pool_and_queue_runs_delivery_on_the_caller_before_returning() {
    let mut cfg = config();
    cfg.pool_max = 1;
    cfg.pool_queue = 1;
    let transport = Arc::new(FakeTransport::new());
    transport.push(ScriptedResponse::Status(200));
    let relay = NotificationRelay::new(cfg, "relay-svc", transport.clone() as Arc<dyn HttpTransport>);

    // Hold the pool's only permit and fill the queue ourselves, so the next
    // `receive` call has nowhere to go but the synchronous "caller runs" path.
    let _held_permit = relay.concurrency.clone().try_acquire_owned().expect("permit available");
    relay.queued.store(relay.config.pool_queue, Ordering::SeqCst);

    relay.receive(InboundNotification {
        method: "POST".to_string(),
        headers: vec![],
        body: None,
    });

    // No `drain()` call: if the delivery had been spawned onto a detached
    // task instead of run inline, this would still be zero.
    assert_eq!(relay.metrics().successes, 1);
    assert_eq!(transport.request_count(), 1);
}
