//! Configuration for the service error handlers.

use crate::notifier::InAppNotifier;
use crate::outfits::DEFAULT_MAX_RECOMMENDATIONS;
use crate::{FallbackEvent, ServiceErrorHandlers};
use aynamoda_resilience_cache::FallbackCache;
use aynamoda_resilience_core::events::{EventListeners, FnListener};
use aynamoda_resilience_core::{Clock, ErrorLog, ErrorLogEntry, KeyValueStore, SystemClock};
use aynamoda_resilience_sync::PendingOperationQueue;
use std::sync::Arc;

pub(crate) struct HandlerConfig {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) cache: FallbackCache,
    pub(crate) queue: PendingOperationQueue,
    pub(crate) error_log: ErrorLog,
    pub(crate) notifier: Option<Arc<dyn InAppNotifier>>,
    pub(crate) max_recommendations: usize,
    pub(crate) event_listeners: EventListeners<FallbackEvent>,
    pub(crate) name: String,
}

/// Builder for [`ServiceErrorHandlers`].
///
/// Unless given explicitly, the cache, queue, and error log are created over
/// the builder's store and clock.
pub struct ServiceErrorHandlersBuilder {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    cache: Option<FallbackCache>,
    queue: Option<PendingOperationQueue>,
    error_log: Option<ErrorLog>,
    notifier: Option<Arc<dyn InAppNotifier>>,
    max_recommendations: usize,
    event_listeners: EventListeners<FallbackEvent>,
    name: String,
}

impl ServiceErrorHandlersBuilder {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            cache: None,
            queue: None,
            error_log: None,
            notifier: None,
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            event_listeners: EventListeners::new(),
            name: "service-error-handlers".to_string(),
        }
    }

    /// Clock used for seasonal estimates and timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn cache(mut self, cache: FallbackCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn queue(mut self, queue: PendingOperationQueue) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    /// Secondary channel for notifications that cannot be queued.
    ///
    /// Without one, a failed queue write escalates straight to a critical entry.
    pub fn notifier<N>(mut self, notifier: N) -> Self
    where
        N: InAppNotifier + 'static,
    {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    pub fn shared_notifier(mut self, notifier: Arc<dyn InAppNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Upper bound on rule-based outfits per call.
    ///
    /// Default: 3
    pub fn max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback for critical escalations.
    pub fn on_critical<F>(mut self, f: F) -> Self
    where
        F: Fn(&ErrorLogEntry) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FallbackEvent::Critical { entry, .. } = event {
                f(entry);
            }
        }));
        self
    }

    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&FallbackEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> ServiceErrorHandlers {
        let cache = self.cache.unwrap_or_else(|| {
            FallbackCache::builder(Arc::clone(&self.store))
                .clock(Arc::clone(&self.clock))
                .name(self.name.clone())
                .build()
        });
        let queue = self.queue.unwrap_or_else(|| {
            PendingOperationQueue::builder(Arc::clone(&self.store))
                .clock(Arc::clone(&self.clock))
                .name(self.name.clone())
                .build()
        });
        let error_log = self
            .error_log
            .unwrap_or_else(|| ErrorLog::new(Arc::clone(&self.store), Arc::clone(&self.clock)));

        ServiceErrorHandlers::from_config(HandlerConfig {
            clock: self.clock,
            cache,
            queue,
            error_log,
            notifier: self.notifier,
            max_recommendations: self.max_recommendations,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}
