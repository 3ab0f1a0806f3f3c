//! Offline-first resilience layer for the AYNAMODA wardrobe app.
//!
//! When a network call fails the app should still show something useful.
//! This crate wires four components into one [`ErrorHandlingService`]:
//!
//! - **Retry** ([`retry`]): bounded retry with exponential backoff; every
//!   failed attempt lands in a capped, persisted error log.
//! - **Fallback cache** ([`cache`]): last good recommendations, weather, and
//!   wardrobe snapshot, never served past their expiry.
//! - **Service error handlers** ([`fallback`]): seasonal weather, rule-based
//!   outfits, and a notification path that escalates only when every channel
//!   fails.
//! - **Pending operations** ([`sync`]): failed feedback, notifications, and
//!   wardrobe edits, replayed on the next sync pass.
//!
//! Each component is also usable on its own through the re-exported crates.
//!
//! # Example
//!
//! ```
//! use aynamoda_resilience::{ErrorHandlingService, ResilienceConfig};
//! use aynamoda_resilience::core::{MemoryStore, OperationContext};
//! use aynamoda_resilience::retry::RetryOptions;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let config = ResilienceConfig::from_json_str(r#"{"retry": {"maxRetries": 1}}"#).unwrap();
//! let service = ErrorHandlingService::builder(Arc::new(MemoryStore::new()))
//!     .config(config)
//!     .build();
//!
//! let ctx = OperationContext::new("weather", "getCurrentWeather");
//! let options = RetryOptions::new(1, Duration::from_millis(10));
//! let result = service
//!     .execute_with_retry(|| async { Err::<(), _>("offline") }, &ctx, &options)
//!     .await;
//!
//! if result.is_err() {
//!     let weather = service.handle_weather_service_error("u1").await;
//!     println!("styling for {:.0}°F in {}", weather.temperature, weather.location);
//! }
//! # }
//! ```

mod config;
mod service;

pub use config::{ConfigError, ResilienceConfig};
pub use service::{ErrorHandlingService, ErrorHandlingServiceBuilder};

pub use aynamoda_resilience_cache as cache;
pub use aynamoda_resilience_core as core;
pub use aynamoda_resilience_fallback as fallback;
pub use aynamoda_resilience_retry as retry;
pub use aynamoda_resilience_sync as sync;

pub use aynamoda_resilience_fallback::{FailureContext, NotificationOutcome};
pub use aynamoda_resilience_retry::{CancellationToken, RetryError, RetryOptions};
pub use aynamoda_resilience_sync::{PendingCategory, SyncReport};
