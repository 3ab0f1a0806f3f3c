//! Walks through a morning without connectivity.
//! Run with: cargo run --example offline_day
//! With a config file: cargo run --example offline_day -- resilience.json

use aynamoda_resilience::core::{
    ItemCategory, JsonFileStore, KeyValueStore, MemoryStore, OperationContext, WardrobeItem,
};
use aynamoda_resilience::sync::{BoxError, FnDestination, PendingCategory, PendingOperation};
use aynamoda_resilience::{ErrorHandlingService, ResilienceConfig, RetryOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ResilienceConfig::load(path)?,
        None => ResilienceConfig::default(),
    };
    let store: Arc<dyn KeyValueStore> = match std::env::var("AYNAMODA_STORE") {
        Ok(path) => Arc::new(JsonFileStore::new(path)),
        Err(_) => Arc::new(MemoryStore::new()),
    };

    let service = ErrorHandlingService::builder(store)
        .config(config)
        .name("offline-demo")
        .destination(
            PendingCategory::Feedback,
            FnDestination::new(|op: PendingOperation| async move {
                println!("backend accepted feedback {}", op.id);
                Ok::<(), BoxError>(())
            }),
        )
        .build();

    let forecast: Result<String, &str> = service
        .execute_with_retry(
            || async { Err("weather API unreachable") },
            &OperationContext::new("weather", "getCurrentWeather"),
            &RetryOptions::new(2, Duration::from_millis(50)),
        )
        .await;
    println!("live forecast: {:?}", forecast);

    let weather = service.handle_weather_service_error("demo-user").await;
    println!(
        "seasonal estimate: {:.0}F, {}",
        weather.temperature,
        weather.condition.as_str()
    );

    let wardrobe = vec![
        WardrobeItem::new("t1", "Oxford shirt", ItemCategory::Top),
        WardrobeItem::new("b1", "Chinos", ItemCategory::Bottom),
        WardrobeItem::new("s1", "White sneakers", ItemCategory::Shoes),
    ];
    for outfit in service
        .handle_ai_service_error(&wardrobe, &weather, "demo-user")
        .await
    {
        let names: Vec<&str> = outfit.items.iter().map(|i| i.name.as_str()).collect();
        println!("fallback outfit: {}", names.join(" + "));
    }

    service
        .handle_feedback_error("demo-user", json!({"outfitId": "o1", "rating": 4}))
        .await?;
    println!("queued feedback, syncing...");

    let report = service.sync_pending_operations().await;
    for category in PendingCategory::ALL {
        println!("{}: {:?}", category.as_str(), report.outcome(category));
    }

    for entry in service.error_logs().await {
        println!(
            "[{}] {}.{}: {}",
            entry.timestamp, entry.service, entry.operation, entry.error_message
        );
    }
    Ok(())
}
