use crate::config::ResilienceConfig;
use aynamoda_resilience_cache::FallbackCache;
use aynamoda_resilience_core::{
    Clock, DailyRecommendations, ErrorLog, ErrorLogEntry, KeyValueStore, OperationContext,
    OutfitRecommendation, StorageError, SystemClock, WardrobeItem, WeatherContext,
};
use aynamoda_resilience_fallback::{
    FailureContext, FallbackEvent, InAppNotifier, NotificationOutcome, ServiceErrorHandlers,
};
use aynamoda_resilience_retry::{
    CancellationToken, RetryError, RetryEvent, RetryExecutor, RetryOptions,
};
use aynamoda_resilience_sync::{
    PendingCategory, PendingOperationQueue, SyncDestination, SyncEvent, SyncReport,
};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// The resilience layer as one object.
///
/// Owns a [`RetryExecutor`], [`FallbackCache`], [`ServiceErrorHandlers`], and
/// [`PendingOperationQueue`] that share one store, clock, and error log.
/// Construct one per app session and pass it to whatever needs it.
#[derive(Clone)]
pub struct ErrorHandlingService {
    retry: RetryExecutor,
    handlers: ServiceErrorHandlers,
    config: ResilienceConfig,
}

impl ErrorHandlingService {
    pub fn builder(store: Arc<dyn KeyValueStore>) -> ErrorHandlingServiceBuilder {
        ErrorHandlingServiceBuilder::new(store)
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    pub fn retry_executor(&self) -> &RetryExecutor {
        &self.retry
    }

    pub fn handlers(&self) -> &ServiceErrorHandlers {
        &self.handlers
    }

    pub fn cache(&self) -> &FallbackCache {
        self.handlers.cache()
    }

    pub fn queue(&self) -> &PendingOperationQueue {
        self.handlers.queue()
    }

    pub fn error_log(&self) -> &ErrorLog {
        self.handlers.error_log()
    }

    /// Retries `operation` with the configured default options.
    pub async fn execute<T, E, F, Fut>(&self, operation: F, context: &OperationContext) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.retry
            .execute_with_retry(operation, context, &self.config.retry)
            .await
    }

    /// Retries `operation` with `options`; the last error is returned as-is.
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        operation: F,
        context: &OperationContext,
        options: &RetryOptions,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.retry.execute_with_retry(operation, context, options).await
    }

    /// Retries `operation` until it succeeds, runs out of retries, or `token`
    /// is cancelled.
    pub async fn execute_with_cancellation<T, E, F, Fut>(
        &self,
        operation: F,
        context: &OperationContext,
        options: &RetryOptions,
        token: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.retry
            .execute_with_cancellation(operation, context, options, token)
            .await
    }

    /// Retries `operation`, then serves the fresh cache entry under
    /// `cache_key` if `options.enable_offline_mode` is set.
    ///
    /// Without a usable entry the original error is returned.
    pub async fn execute_with_offline_fallback<T, E, F, Fut>(
        &self,
        operation: F,
        context: &OperationContext,
        options: &RetryOptions,
        cache_key: &str,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        T: DeserializeOwned,
    {
        let error = match self.retry.execute_with_retry(operation, context, options).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        if !options.enable_offline_mode {
            return Err(error);
        }

        match self.cache().get_cached(cache_key).await {
            Some(value) => {
                tracing::info!(
                    service = %context.service,
                    operation = %context.operation,
                    cache_key,
                    "serving cached value while offline"
                );
                Ok(value)
            }
            None => Err(error),
        }
    }

    pub async fn handle_weather_service_error(&self, user_id: &str) -> WeatherContext {
        self.handlers.handle_weather_service_error(user_id).await
    }

    pub async fn handle_ai_service_error(
        &self,
        items: &[WardrobeItem],
        weather: &WeatherContext,
        user_id: &str,
    ) -> Vec<OutfitRecommendation> {
        self.handlers
            .handle_ai_service_error(items, weather, user_id)
            .await
    }

    pub async fn handle_notification_error(
        &self,
        user_id: &str,
        payload: serde_json::Value,
    ) -> NotificationOutcome {
        self.handlers
            .handle_notification_error(user_id, payload)
            .await
    }

    pub async fn handle_feedback_error(
        &self,
        user_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), StorageError> {
        self.handlers.handle_feedback_error(user_id, payload).await
    }

    pub async fn handle_wardrobe_update_error(
        &self,
        user_id: &str,
        payload: serde_json::Value,
    ) -> Result<(), StorageError> {
        self.handlers
            .handle_wardrobe_update_error(user_id, payload)
            .await
    }

    pub async fn cache_recommendations(
        &self,
        user_id: &str,
        recommendations: &DailyRecommendations,
        date: Option<NaiveDate>,
    ) -> Result<(), StorageError> {
        self.cache()
            .cache_recommendations(user_id, recommendations, date)
            .await
    }

    pub async fn get_cached_recommendations(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> Option<DailyRecommendations> {
        self.cache().get_cached_recommendations(user_id, date).await
    }

    pub async fn cache_weather(
        &self,
        user_id: &str,
        weather: &WeatherContext,
    ) -> Result<(), StorageError> {
        self.cache().cache_weather(user_id, weather).await
    }

    pub async fn get_cached_weather(&self, user_id: &str) -> Option<WeatherContext> {
        self.cache().get_cached_weather(user_id).await
    }

    pub async fn cache_wardrobe(
        &self,
        user_id: &str,
        items: &[WardrobeItem],
    ) -> Result<(), StorageError> {
        self.cache().cache_wardrobe(user_id, items).await
    }

    pub async fn get_cached_wardrobe(&self, user_id: &str) -> Option<Vec<WardrobeItem>> {
        self.cache().get_cached_wardrobe(user_id).await
    }

    pub async fn sync_pending_operations(&self) -> SyncReport {
        self.queue().sync_pending_operations().await
    }

    pub fn user_friendly_message(&self, context: FailureContext) -> &'static str {
        aynamoda_resilience_fallback::user_friendly_message(context)
    }

    pub fn recovery_actions(&self, context: FailureContext) -> &'static [&'static str] {
        aynamoda_resilience_fallback::recovery_actions(context)
    }

    /// Persisted error log, oldest first. Unreadable storage reads as empty.
    pub async fn error_logs(&self) -> Vec<ErrorLogEntry> {
        match self.error_log().entries().await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::debug!(%error, "could not read error log");
                Vec::new()
            }
        }
    }

    pub async fn clear_error_logs(&self) -> Result<(), StorageError> {
        self.error_log().clear().await
    }
}

impl fmt::Debug for ErrorHandlingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlingService")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// Builder for [`ErrorHandlingService`].
pub struct ErrorHandlingServiceBuilder {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    config: ResilienceConfig,
    notifier: Option<Arc<dyn InAppNotifier>>,
    destinations: Vec<(PendingCategory, Arc<dyn SyncDestination>)>,
    retry_listeners: Vec<Box<dyn Fn(&RetryEvent) + Send + Sync>>,
    fallback_listeners: Vec<Box<dyn Fn(&FallbackEvent) + Send + Sync>>,
    sync_listeners: Vec<Box<dyn Fn(&SyncEvent) + Send + Sync>>,
    name: String,
}

impl ErrorHandlingServiceBuilder {
    fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            config: ResilienceConfig::default(),
            notifier: None,
            destinations: Vec::new(),
            retry_listeners: Vec::new(),
            fallback_listeners: Vec::new(),
            sync_listeners: Vec::new(),
            name: "aynamoda".to_string(),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(mut self, config: ResilienceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn notifier<N>(mut self, notifier: N) -> Self
    where
        N: InAppNotifier + 'static,
    {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Registers where queued `category` entries are replayed to.
    pub fn destination<D>(mut self, category: PendingCategory, destination: D) -> Self
    where
        D: SyncDestination + 'static,
    {
        self.destinations.push((category, Arc::new(destination)));
        self
    }

    /// Name reported in events, logs, and metrics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn on_retry_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&RetryEvent) + Send + Sync + 'static,
    {
        self.retry_listeners.push(Box::new(f));
        self
    }

    pub fn on_fallback_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&FallbackEvent) + Send + Sync + 'static,
    {
        self.fallback_listeners.push(Box::new(f));
        self
    }

    pub fn on_sync_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.sync_listeners.push(Box::new(f));
        self
    }

    pub fn build(self) -> ErrorHandlingService {
        let error_log = ErrorLog::with_capacity(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            self.config.error_log_capacity,
        );

        let mut retry = RetryExecutor::builder()
            .defaults(self.config.retry.clone())
            .error_log(error_log.clone())
            .clock(Arc::clone(&self.clock))
            .name(self.name.clone());
        for listener in self.retry_listeners {
            retry = retry.on_event(listener);
        }

        let cache = FallbackCache::builder(Arc::clone(&self.store))
            .clock(Arc::clone(&self.clock))
            .ttls(self.config.cache_ttls.clone())
            .name(self.name.clone())
            .build();

        let mut queue = PendingOperationQueue::builder(Arc::clone(&self.store))
            .clock(Arc::clone(&self.clock))
            .error_log(error_log.clone())
            .name(self.name.clone());
        for (category, destination) in self.destinations {
            queue = queue.shared_destination(category, destination);
        }
        for listener in self.sync_listeners {
            queue = queue.on_event(listener);
        }

        let mut handlers = ServiceErrorHandlers::builder(Arc::clone(&self.store))
            .clock(Arc::clone(&self.clock))
            .cache(cache)
            .queue(queue.build())
            .error_log(error_log)
            .max_recommendations(self.config.max_recommendations)
            .name(self.name.clone());
        if let Some(notifier) = self.notifier {
            handlers = handlers.shared_notifier(notifier);
        }
        for listener in self.fallback_listeners {
            handlers = handlers.on_event(listener);
        }

        tracing::debug!(name = %self.name, config = ?self.config, "resilience layer ready");

        ErrorHandlingService {
            retry: retry.build(),
            handlers: handlers.build(),
            config: self.config,
        }
    }
}
