//! The retry executor as a Tower layer around a backend client.

use aynamoda_resilience_core::{ErrorLog, ManualClock, MemoryStore, OperationContext};
use aynamoda_resilience_retry::{RetryExecutor, RetryLayer, RetryOptions};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::{Layer, Service, ServiceBuilder, ServiceExt};

#[tokio::test(start_paused = true)]
async fn layer_retries_failed_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let cc = Arc::clone(&calls);
    let backend = tower::service_fn(move |user_id: String| {
        let n = cc.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < 2 {
                Err(format!("503 for {}", user_id))
            } else {
                Ok(format!("wardrobe of {}", user_id))
            }
        }
    });

    let layer = RetryLayer::new(
        RetryExecutor::builder().name("wardrobe-client").build(),
        OperationContext::new("wardrobe", "fetchItems"),
        RetryOptions::new(3, Duration::from_millis(20)),
    );
    let mut service = layer.layer(backend);

    let response = service
        .ready()
        .await
        .unwrap()
        .call("u1".to_string())
        .await;

    assert_eq!(response, Ok("wardrobe of u1".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn layer_in_service_builder_logs_failures() {
    let log = ErrorLog::new(
        Arc::new(MemoryStore::new()),
        Arc::new(ManualClock::new(Utc::now())),
    );
    let executor = RetryExecutor::builder().error_log(log.clone()).build();

    let mut service = ServiceBuilder::new()
        .layer(RetryLayer::new(
            executor,
            OperationContext::new("notification", "schedule"),
            RetryOptions::new(1, Duration::from_millis(5)),
        ))
        .service(tower::service_fn(|_: u32| async {
            Err::<(), _>("push gateway unavailable")
        }));

    let result = service.ready().await.unwrap().call(7).await;

    assert_eq!(result, Err("push gateway unavailable"));
    let entries = log.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].service, "notification");
}
