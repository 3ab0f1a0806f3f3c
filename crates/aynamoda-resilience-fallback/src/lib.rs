//! Deterministic substitutes for failed service calls.
//!
//! [`ServiceErrorHandlers`] is what a caller reaches for after
//! [`RetryExecutor`](https://docs.rs/aynamoda-resilience-retry) has given up.
//! Each handler produces something the UI can show without the network:
//!
//! - **Weather**: cached weather, else a seasonal estimate by calendar month
//!   with `location = "Unknown"`.
//! - **AI styling**: rule-based outfits filtered for the weather, falling back
//!   to recently worn pieces when the filter leaves nothing.
//! - **Notifications**: queued for the next sync pass, else shown in-app, else
//!   escalated as a `CRITICAL ERROR` for manual follow-up.
//! - **Feedback and wardrobe edits**: queued for the next sync pass.
//!
//! Only the last notification step reports failure; every other handler
//! absorbs it.
//!
//! # Examples
//!
//! ```
//! use aynamoda_resilience_core::MemoryStore;
//! use aynamoda_resilience_fallback::ServiceErrorHandlers;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let handlers = ServiceErrorHandlers::builder(Arc::new(MemoryStore::new()))
//!     .max_recommendations(2)
//!     .on_critical(|entry| eprintln!("page on-call: {}", entry.error_message))
//!     .build();
//!
//! let weather = handlers.handle_weather_service_error("u1").await;
//! let outfits = handlers.handle_ai_service_error(&[], &weather, "u1").await;
//! assert!(outfits.is_empty());
//! # }
//! ```

mod config;
mod events;
mod messages;
mod notifier;
mod outfits;
mod weather;

pub use config::ServiceErrorHandlersBuilder;
pub use events::FallbackEvent;
pub use messages::{recovery_actions, user_friendly_message, FailureContext};
pub use notifier::{FnNotifier, InAppNotifier};
pub use outfits::{
    emergency_order, is_weather_appropriate, plan_outfits, OutfitPlan,
    DEFAULT_MAX_RECOMMENDATIONS,
};
pub use weather::{seasonal_weather, Season, UNKNOWN_LOCATION};

use aynamoda_resilience_cache::FallbackCache;
use aynamoda_resilience_core::{
    ErrorLog, ErrorLogEntry, KeyValueStore, OperationContext, OutfitRecommendation, Severity,
    StorageError, WardrobeItem, WeatherContext, CRITICAL_MARKER,
};
use aynamoda_resilience_sync::{PendingCategory, PendingOperation, PendingOperationQueue};
use config::HandlerConfig;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// How a failed notification was dealt with.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    /// Queued under `pending_notifications`.
    Queued,
    /// Shown through the in-app channel.
    DeliveredInApp,
    /// Neither worked. The entry was emitted and, if storage allowed, logged.
    Escalated(ErrorLogEntry),
}

/// Substitute producers for weather, styling, and notification failures.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct ServiceErrorHandlers {
    config: Arc<HandlerConfig>,
}

impl ServiceErrorHandlers {
    pub fn builder(store: Arc<dyn KeyValueStore>) -> ServiceErrorHandlersBuilder {
        ServiceErrorHandlersBuilder::new(store)
    }

    pub(crate) fn from_config(config: HandlerConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "fallback_handler_calls_total",
                "Total number of fallback handler invocations by handler and outcome"
            );
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn cache(&self) -> &FallbackCache {
        &self.config.cache
    }

    pub fn queue(&self) -> &PendingOperationQueue {
        &self.config.queue
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.config.error_log
    }

    /// Weather to style against when the weather service is unreachable.
    pub async fn handle_weather_service_error(&self, user_id: &str) -> WeatherContext {
        let cached = self.config.cache.get_cached_weather(user_id).await;
        let from_cache = cached.is_some();
        let weather = cached.unwrap_or_else(|| seasonal_weather(self.config.clock.now()));

        tracing::debug!(
            user_id,
            from_cache,
            temperature = weather.temperature,
            "serving substitute weather"
        );
        self.record_call("weather", if from_cache { "cache" } else { "seasonal" });
        self.emit(FallbackEvent::WeatherSubstituted {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            user_id: user_id.to_string(),
            from_cache,
        });
        weather
    }

    /// Rule-based outfits when the recommendation service is unreachable.
    ///
    /// Returns at most `max_recommendations` outfits; an empty wardrobe gives
    /// an empty list.
    pub async fn handle_ai_service_error(
        &self,
        items: &[WardrobeItem],
        weather: &WeatherContext,
        user_id: &str,
    ) -> Vec<OutfitRecommendation> {
        let plan = plan_outfits(
            items,
            weather,
            self.config.max_recommendations,
            self.config.clock.now(),
        );

        if plan.emergency && !items.is_empty() {
            tracing::info!(user_id, items = items.len(), "no weather-appropriate items, using recent favorites");
        }
        self.record_call("ai", if plan.emergency { "emergency" } else { "rules" });
        self.emit(FallbackEvent::OutfitsSubstituted {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            user_id: user_id.to_string(),
            count: plan.outfits.len(),
            emergency: plan.emergency,
        });
        plan.outfits
    }

    /// Keeps a notification from being lost.
    ///
    /// Tries the pending queue, then the in-app channel. If both fail a
    /// [`Severity::Critical`] entry for `notification.handleNotificationError`
    /// is emitted as [`FallbackEvent::Critical`] and written to the error log
    /// when storage allows.
    pub async fn handle_notification_error(
        &self,
        user_id: &str,
        payload: serde_json::Value,
    ) -> NotificationOutcome {
        let operation = PendingOperation::new(user_id, payload.clone(), self.config.clock.now());
        let queue_error = match self
            .config
            .queue
            .enqueue(PendingCategory::Notifications, operation)
            .await
        {
            Ok(()) => {
                self.record_call("notification", "queued");
                self.emit_queued(user_id, PendingCategory::Notifications);
                return NotificationOutcome::Queued;
            }
            Err(e) => e,
        };

        tracing::warn!(user_id, error = %queue_error, "could not queue notification, trying in-app");

        let in_app_error = match &self.config.notifier {
            Some(notifier) => match notifier.notify(user_id, &payload).await {
                Ok(()) => {
                    self.record_call("notification", "in_app");
                    self.emit(FallbackEvent::DeliveredInApp {
                        source: self.config.name.clone(),
                        timestamp: self.config.clock.now(),
                        user_id: user_id.to_string(),
                    });
                    return NotificationOutcome::DeliveredInApp;
                }
                Err(e) => e.to_string(),
            },
            None => "no in-app channel configured".to_string(),
        };

        let context = OperationContext::new("notification", "handleNotificationError");
        let message = format!(
            "notification for user {} lost: queue failed ({}), in-app failed ({})",
            user_id, queue_error, in_app_error
        );
        let entry = match self.config.error_log.record_critical(&context, &message).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::error!(error = %e, "critical entry could not be persisted");
                self.config.error_log.entry(
                    &context,
                    format!("{}: {}", CRITICAL_MARKER, message),
                    Severity::Critical,
                )
            }
        };

        self.record_call("notification", "critical");
        self.emit(FallbackEvent::Critical {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            entry: entry.clone(),
        });
        NotificationOutcome::Escalated(entry)
    }

    /// Queues outfit feedback that could not be submitted.
    pub async fn handle_feedback_error(
        &self,
        user_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), StorageError> {
        self.enqueue("feedback", PendingCategory::Feedback, user_id, payload)
            .await
    }

    /// Queues a wardrobe edit that could not be saved.
    pub async fn handle_wardrobe_update_error(
        &self,
        user_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), StorageError> {
        self.enqueue("wardrobe", PendingCategory::WardrobeUpdates, user_id, payload)
            .await
    }

    async fn enqueue(
        &self,
        handler: &'static str,
        category: PendingCategory,
        user_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), StorageError> {
        let operation = PendingOperation::new(user_id, payload, self.config.clock.now());
        match self.config.queue.enqueue(category, operation).await {
            Ok(()) => {
                self.record_call(handler, "queued");
                self.emit_queued(user_id, category);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id, %category, error = %e, "could not queue pending operation");
                let context = OperationContext::new(handler, "enqueuePending");
                if let Err(log_error) = self.config.error_log.record(&context, e.to_string()).await {
                    tracing::debug!(error = %log_error, "could not record queue failure");
                }
                self.record_call(handler, "failed");
                Err(e)
            }
        }
    }

    fn emit_queued(&self, user_id: &str, category: PendingCategory) {
        self.emit(FallbackEvent::Queued {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            user_id: user_id.to_string(),
            category,
        });
    }

    fn emit(&self, event: FallbackEvent) {
        self.config.event_listeners.emit(&event);
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn record_call(&self, handler: &'static str, outcome: &'static str) {
        #[cfg(feature = "metrics")]
        counter!(
            "fallback_handler_calls_total",
            "handler" => handler,
            "outcome" => outcome
        )
        .increment(1);
    }
}

impl std::fmt::Debug for ServiceErrorHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceErrorHandlers")
            .field("name", &self.config.name)
            .field("max_recommendations", &self.config.max_recommendations)
            .field("has_notifier", &self.config.notifier.is_some())
            .finish_non_exhaustive()
    }
}
