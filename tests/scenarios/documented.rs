//! Reference behaviors, one per component.

use super::{backend, january_morning, store};
use aynamoda_resilience::core::{
    keys, ChaosStore, DailyRecommendations, FaultScope, MemoryStore, OperationContext,
};
use aynamoda_resilience::fallback::FnNotifier;
use aynamoda_resilience::sync::{BoxError, PendingCategory};
use aynamoda_resilience::{ErrorHandlingService, NotificationOutcome, RetryOptions};
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn flaky_call_succeeds_on_the_third_attempt() {
    let service = ErrorHandlingService::builder(store()).build();
    let calls = AtomicUsize::new(0);

    let result = service
        .execute_with_retry(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("network request failed")
                    } else {
                        Ok("success")
                    }
                }
            },
            &OperationContext::new("api", "fetchOutfits"),
            &RetryOptions::new(2, Duration::from_millis(10)),
        )
        .await;

    assert_eq!(result, Ok("success"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn january_without_cache_gets_a_cold_seasonal_estimate() {
    let service = ErrorHandlingService::builder(store())
        .clock(january_morning())
        .build();

    let weather = service.handle_weather_service_error("u1").await;

    assert!(weather.temperature < 50.0);
    assert_eq!(weather.location, "Unknown");
    assert!(weather.is_fallback);
}

#[tokio::test]
async fn cached_recommendations_come_back_by_id() {
    let clock = january_morning();
    let service = ErrorHandlingService::builder(store()).clock(clock).build();
    let recommendations = DailyRecommendations {
        id: "rec-2025-01-14".to_string(),
        user_id: "u1".to_string(),
        date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
        recommendations: Vec::new(),
        generated_at: Utc.with_ymd_and_hms(2025, 1, 14, 6, 0, 0).unwrap(),
    };

    service
        .cache_recommendations("u1", &recommendations, None)
        .await
        .unwrap();
    let cached = service.get_cached_recommendations("u1", None).await.unwrap();

    assert_eq!(cached.id, recommendations.id);
    assert_eq!(cached, recommendations);
}

#[tokio::test]
async fn clean_sync_clears_all_three_lists() {
    let store = store();
    let received = Arc::new(Mutex::new(Vec::new()));
    let service = ErrorHandlingService::builder(store.clone())
        .destination(PendingCategory::Feedback, backend(received.clone()))
        .destination(PendingCategory::Notifications, backend(received.clone()))
        .destination(PendingCategory::WardrobeUpdates, backend(received.clone()))
        .build();

    service.handle_feedback_error("u1", json!({"rating": 4})).await.unwrap();
    service.handle_notification_error("u1", json!({"title": "Rain later"})).await;
    service
        .handle_wardrobe_update_error("u1", json!({"itemId": "i3"}))
        .await
        .unwrap();

    let report = service.sync_pending_operations().await;

    assert!(report.is_clean());
    assert_eq!(received.lock().unwrap().len(), 3);
    for key in [
        keys::PENDING_FEEDBACK,
        keys::PENDING_NOTIFICATIONS,
        keys::PENDING_WARDROBE_UPDATES,
    ] {
        assert!(!store.contains_key(key));
    }
}

#[tokio::test]
async fn notification_with_nowhere_to_go_is_critical() {
    // Writes fail everywhere except the error log itself.
    let chaos = Arc::new(ChaosStore::new(Arc::new(MemoryStore::new())));
    chaos.fail_writes(FaultScope::keys([keys::PENDING_NOTIFICATIONS]));
    let service = ErrorHandlingService::builder(chaos.clone())
        .clock(january_morning())
        .notifier(FnNotifier::new(|_: String, _: Value| async {
            Err::<(), BoxError>("in-app channel unavailable".into())
        }))
        .build();

    let outcome = service
        .handle_notification_error("u1", json!({"title": "Outfit ready"}))
        .await;

    let NotificationOutcome::Escalated(entry) = &outcome else {
        panic!("expected escalation, got {:?}", outcome);
    };
    assert_eq!(entry.service, "notification");
    assert!(entry.error_message.contains("CRITICAL ERROR"));

    let logs = service.error_logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].service, "notification");
    assert!(logs[0].is_critical());
}
