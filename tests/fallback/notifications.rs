//! Failed notifications: queue first, in-app second, critical escalation last.

use super::clock_at;
use aynamoda_resilience_core::{keys, ChaosStore, FaultScope, MemoryStore, Severity};
use aynamoda_resilience_fallback::{
    FnNotifier, InAppNotifier, NotificationOutcome, ServiceErrorHandlers,
};
use aynamoda_resilience_sync::{BoxError, PendingCategory};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn reminder() -> Value {
    json!({ "title": "Your outfit is ready", "scheduledFor": "07:30" })
}

fn recording_notifier(delivered: Arc<Mutex<Vec<(String, Value)>>>) -> impl InAppNotifier {
    FnNotifier::new(move |user: String, payload: Value| {
        delivered.lock().unwrap().push((user, payload));
        async { Ok::<(), BoxError>(()) }
    })
}

fn broken_notifier() -> impl InAppNotifier {
    FnNotifier::new(|_: String, _: Value| async { Err::<(), BoxError>("banner service down".into()) })
}

#[tokio::test]
async fn notification_is_queued_when_storage_works() {
    let handlers = ServiceErrorHandlers::builder(Arc::new(MemoryStore::new()))
        .clock(clock_at(2025, 3, 3))
        .build();

    let outcome = handlers.handle_notification_error("u1", reminder()).await;

    assert_eq!(outcome, NotificationOutcome::Queued);
    let queued = handlers
        .queue()
        .pending(PendingCategory::Notifications)
        .await
        .unwrap();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].user_id, "u1");
    assert_eq!(queued[0].payload, reminder());
}

#[tokio::test]
async fn in_app_channel_is_used_when_the_queue_cannot_be_written() {
    let chaos = Arc::new(ChaosStore::new(Arc::new(MemoryStore::new())));
    chaos.fail_writes(FaultScope::keys([keys::PENDING_NOTIFICATIONS]));
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let handlers = ServiceErrorHandlers::builder(chaos.clone())
        .clock(clock_at(2025, 3, 3))
        .notifier(recording_notifier(Arc::clone(&delivered)))
        .build();

    let outcome = handlers.handle_notification_error("u1", reminder()).await;

    assert_eq!(outcome, NotificationOutcome::DeliveredInApp);
    assert_eq!(*delivered.lock().unwrap(), vec![("u1".to_string(), reminder())]);
    assert!(handlers.error_log().entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn both_channels_failing_escalates_to_a_critical_entry() {
    let chaos = Arc::new(ChaosStore::new(Arc::new(MemoryStore::new())));
    chaos.fail_writes(FaultScope::keys([keys::PENDING_NOTIFICATIONS]));
    let handlers = ServiceErrorHandlers::builder(chaos.clone())
        .clock(clock_at(2025, 3, 3))
        .notifier(broken_notifier())
        .build();

    let outcome = handlers.handle_notification_error("u1", reminder()).await;

    let entry = match outcome {
        NotificationOutcome::Escalated(entry) => entry,
        other => panic!("expected escalation, got {:?}", other),
    };
    assert_eq!(entry.service, "notification");
    assert!(entry.error_message.contains("CRITICAL ERROR"));
    assert!(entry.error_message.contains("banner service down"));
    assert_eq!(entry.severity, Severity::Critical);

    let logged = handlers.error_log().entries().await.unwrap();
    assert_eq!(logged, vec![entry]);
}

#[tokio::test]
async fn missing_notifier_escalates_directly() {
    let chaos = Arc::new(ChaosStore::new(Arc::new(MemoryStore::new())));
    chaos.fail_writes(FaultScope::keys([keys::PENDING_NOTIFICATIONS]));
    let handlers = ServiceErrorHandlers::builder(chaos.clone())
        .clock(clock_at(2025, 3, 3))
        .build();

    let outcome = handlers.handle_notification_error("u1", reminder()).await;

    assert!(matches!(outcome, NotificationOutcome::Escalated(ref e) if e.is_critical()));
}

#[tokio::test]
async fn critical_listener_fires_even_when_nothing_can_be_stored() {
    let chaos = Arc::new(ChaosStore::new(Arc::new(MemoryStore::new())));
    chaos.fail_writes(FaultScope::All);
    let critical = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&critical);
    let handlers = ServiceErrorHandlers::builder(chaos.clone())
        .clock(clock_at(2025, 3, 3))
        .notifier(broken_notifier())
        .on_critical(move |entry| sink.lock().unwrap().push(entry.clone()))
        .build();

    let outcome = handlers.handle_notification_error("u1", reminder()).await;

    let critical = critical.lock().unwrap();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].service, "notification");
    assert!(critical[0].error_message.starts_with("CRITICAL ERROR"));
    assert_eq!(outcome, NotificationOutcome::Escalated(critical[0].clone()));
}
