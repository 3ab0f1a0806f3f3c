//! Replaying queued operations to their destinations.

use super::{accepting, rejecting, Inbox};
use aynamoda_resilience_core::{
    keys, ChaosStore, ErrorLog, FaultScope, KeyValueStore, ManualClock, MemoryStore,
};
use aynamoda_resilience_sync::{
    BoxError, FnDestination, PendingCategory, PendingOperation, PendingOperationQueue, SyncEvent,
    SyncOutcome,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
    ))
}

fn op(n: u32) -> PendingOperation {
    PendingOperation::new("u1", json!({ "n": n }), Utc.with_ymd_and_hms(2025, 6, 1, 17, 0, 0).unwrap())
}

#[tokio::test]
async fn all_three_lists_are_cleared_after_a_clean_sync() {
    let store = Arc::new(MemoryStore::new());
    let (feedback, notifications, wardrobe) = (
        Arc::new(Inbox::default()),
        Arc::new(Inbox::default()),
        Arc::new(Inbox::default()),
    );
    let queue = PendingOperationQueue::builder(store.clone())
        .destination(PendingCategory::Feedback, accepting(feedback.clone()))
        .destination(PendingCategory::Notifications, accepting(notifications.clone()))
        .destination(PendingCategory::WardrobeUpdates, accepting(wardrobe.clone()))
        .build();

    for category in PendingCategory::ALL {
        queue.enqueue(category, op(1)).await.unwrap();
        queue.enqueue(category, op(2)).await.unwrap();
    }

    let report = queue.sync_pending_operations().await;

    assert!(report.is_clean());
    assert_eq!(report.synced().count(), 3);
    for key in [
        keys::PENDING_FEEDBACK,
        keys::PENDING_NOTIFICATIONS,
        keys::PENDING_WARDROBE_UPDATES,
    ] {
        assert!(!store.contains_key(key), "{} still present", key);
    }
    assert_eq!(feedback.len(), 2);
    assert_eq!(notifications.len(), 2);
    assert_eq!(wardrobe.len(), 2);
}

#[tokio::test]
async fn entries_are_replayed_in_queue_order() {
    let inbox = Arc::new(Inbox::default());
    let queue = PendingOperationQueue::builder(Arc::new(MemoryStore::new()))
        .destination(PendingCategory::Feedback, accepting(inbox.clone()))
        .build();
    let ops: Vec<_> = (0..5).map(op).collect();
    for o in &ops {
        queue.enqueue(PendingCategory::Feedback, o.clone()).await.unwrap();
    }

    queue.sync_pending_operations().await;

    let expected: Vec<String> = ops.iter().map(|o| o.id.clone()).collect();
    assert_eq!(inbox.ids(), expected);
}

#[tokio::test]
async fn failed_category_keeps_its_list_and_others_still_sync() {
    let store = Arc::new(MemoryStore::new());
    let log = ErrorLog::new(store.clone(), clock());
    let inbox = Arc::new(Inbox::default());
    let queue = PendingOperationQueue::builder(store.clone())
        .clock(clock())
        .error_log(log.clone())
        .destination(PendingCategory::Feedback, rejecting("feedback API returned 500"))
        .destination(PendingCategory::WardrobeUpdates, accepting(inbox.clone()))
        .build();

    queue.enqueue(PendingCategory::Feedback, op(1)).await.unwrap();
    queue.enqueue(PendingCategory::WardrobeUpdates, op(2)).await.unwrap();

    let report = queue.sync_pending_operations().await;

    assert!(!report.is_clean());
    assert!(matches!(
        report.outcome(PendingCategory::Feedback),
        Some(SyncOutcome::Failed { .. })
    ));
    assert_eq!(
        report.outcome(PendingCategory::WardrobeUpdates),
        Some(&SyncOutcome::Synced { count: 1 })
    );
    assert_eq!(
        report.outcome(PendingCategory::Notifications),
        Some(&SyncOutcome::Empty)
    );
    assert_eq!(queue.pending(PendingCategory::Feedback).await.unwrap().len(), 1);
    assert!(!store.contains_key(keys::PENDING_WARDROBE_UPDATES));

    let entries = log.entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].service, "sync");
    assert_eq!(entries[0].operation, "syncPendingOperations");
    assert!(entries[0].error_message.starts_with("Failed to sync pending feedback"));
    assert!(entries[0].error_message.contains("feedback API returned 500"));
}

#[tokio::test]
async fn a_partial_failure_replays_the_whole_list_next_time() {
    let accepted = Arc::new(Mutex::new(Vec::<String>::new()));
    let fail_third = Arc::new(AtomicUsize::new(0));
    let destination = {
        let accepted = Arc::clone(&accepted);
        let calls = Arc::clone(&fail_third);
        FnDestination::new(move |op: PendingOperation| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let result = if n == 2 {
                Err::<(), BoxError>("connection reset".into())
            } else {
                accepted.lock().unwrap().push(op.id);
                Ok(())
            };
            async move { result }
        })
    };
    let queue = PendingOperationQueue::builder(Arc::new(MemoryStore::new()))
        .destination(PendingCategory::Notifications, destination)
        .build();
    let ops: Vec<_> = (0..3).map(op).collect();
    for o in &ops {
        queue.enqueue(PendingCategory::Notifications, o.clone()).await.unwrap();
    }

    let first = queue.sync_pending_operations().await;
    let second = queue.sync_pending_operations().await;

    assert_eq!(first.failed().collect::<Vec<_>>(), vec![PendingCategory::Notifications]);
    assert_eq!(
        second.outcome(PendingCategory::Notifications),
        Some(&SyncOutcome::Synced { count: 3 })
    );
    // The first two were delivered twice; ids let the backend drop the repeats.
    let accepted = accepted.lock().unwrap();
    assert_eq!(accepted.len(), 5);
    assert_eq!(accepted[0], ops[0].id);
    assert_eq!(accepted[2], ops[0].id);
}

#[tokio::test]
async fn category_without_destination_is_left_alone() {
    let store = Arc::new(MemoryStore::new());
    let queue = PendingOperationQueue::builder(store.clone()).build();
    queue.enqueue(PendingCategory::Feedback, op(1)).await.unwrap();

    let report = queue.sync_pending_operations().await;

    assert_eq!(
        report.outcome(PendingCategory::Feedback),
        Some(&SyncOutcome::NoDestination)
    );
    assert!(report.is_clean());
    assert!(store.contains_key(keys::PENDING_FEEDBACK));
    assert!(!queue.has_destination(PendingCategory::Feedback));
}

#[tokio::test]
async fn list_that_cannot_be_cleared_is_reported_as_failed() {
    let chaos = Arc::new(ChaosStore::new(Arc::new(MemoryStore::new())));
    let inbox = Arc::new(Inbox::default());
    let queue = PendingOperationQueue::builder(chaos.clone())
        .destination(PendingCategory::Feedback, accepting(inbox.clone()))
        .build();
    queue.enqueue(PendingCategory::Feedback, op(1)).await.unwrap();
    chaos.fail_removes(FaultScope::All);

    let report = queue.sync_pending_operations().await;

    assert_eq!(report.failed().collect::<Vec<_>>(), vec![PendingCategory::Feedback]);
    assert_eq!(inbox.len(), 1);
    assert_eq!(queue.pending(PendingCategory::Feedback).await.unwrap().len(), 1);
}

#[tokio::test]
async fn corrupt_list_fails_sync_but_accepts_new_entries() {
    let store = Arc::new(MemoryStore::new());
    store
        .set_item(keys::PENDING_FEEDBACK, "[{broken".to_string())
        .await
        .unwrap();
    let inbox = Arc::new(Inbox::default());
    let queue = PendingOperationQueue::builder(store.clone())
        .destination(PendingCategory::Feedback, accepting(inbox.clone()))
        .build();

    let before = queue.sync_pending_operations().await;
    assert!(matches!(
        before.outcome(PendingCategory::Feedback),
        Some(SyncOutcome::Failed { .. })
    ));

    queue.enqueue(PendingCategory::Feedback, op(7)).await.unwrap();
    let after = queue.sync_pending_operations().await;
    assert_eq!(
        after.outcome(PendingCategory::Feedback),
        Some(&SyncOutcome::Synced { count: 1 })
    );
}

#[tokio::test]
async fn sync_events_follow_the_report() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let queue = PendingOperationQueue::builder(Arc::new(MemoryStore::new()))
        .name("device-sync")
        .destination(PendingCategory::Feedback, accepting(Arc::new(Inbox::default())))
        .destination(PendingCategory::Notifications, rejecting("push service down"))
        .on_event(move |e: &SyncEvent| {
            let kind = match e {
                SyncEvent::Enqueued { .. } => "enqueued",
                SyncEvent::Synced { .. } => "synced",
                SyncEvent::Failed { .. } => "failed",
            };
            sink.lock().unwrap().push((kind, e.category()));
        })
        .build();

    queue.enqueue(PendingCategory::Feedback, op(1)).await.unwrap();
    queue.enqueue(PendingCategory::Notifications, op(2)).await.unwrap();
    queue.sync_pending_operations().await;

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ("enqueued", PendingCategory::Feedback),
            ("enqueued", PendingCategory::Notifications),
            ("synced", PendingCategory::Feedback),
            ("failed", PendingCategory::Notifications),
        ]
    );
}

#[tokio::test]
async fn entries_stored_without_an_id_keep_one_id_across_passes() {
    let store = Arc::new(MemoryStore::new());
    store
        .set_item(
            keys::PENDING_FEEDBACK,
            r#"[{"userId":"u1","payload":{"r":1},"timestamp":"2024-01-01T00:00:00Z"}]"#.to_string(),
        )
        .await
        .unwrap();
    let accepted = Arc::new(Mutex::new(Vec::<String>::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let destination = {
        let accepted = Arc::clone(&accepted);
        let calls = Arc::clone(&calls);
        FnDestination::new(move |op: PendingOperation| {
            accepted.lock().unwrap().push(op.id);
            let result = if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err::<(), BoxError>("gateway timeout".into())
            } else {
                Ok(())
            };
            async move { result }
        })
    };
    let queue = PendingOperationQueue::builder(store.clone())
        .destination(PendingCategory::Feedback, destination)
        .build();

    let first_read = queue.pending(PendingCategory::Feedback).await.unwrap();
    let second_read = queue.pending(PendingCategory::Feedback).await.unwrap();
    assert_eq!(first_read[0].id, second_read[0].id);

    queue.sync_pending_operations().await;
    let report = queue.sync_pending_operations().await;

    assert_eq!(
        report.outcome(PendingCategory::Feedback),
        Some(&SyncOutcome::Synced { count: 1 })
    );
    let accepted = accepted.lock().unwrap();
    assert_eq!(accepted.len(), 2);
    assert_eq!(accepted[0], accepted[1]);
    assert_eq!(accepted[0], first_read[0].id);
}
