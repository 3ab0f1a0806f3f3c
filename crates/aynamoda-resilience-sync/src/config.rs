use crate::events::SyncEvent;
use crate::{PendingCategory, PendingOperationQueue, SyncDestination};
use aynamoda_resilience_core::events::{EventListeners, FnListener};
use aynamoda_resilience_core::{Clock, ErrorLog, KeyValueStore, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) struct QueueConfig {
    pub(crate) store: Arc<dyn KeyValueStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) error_log: Option<ErrorLog>,
    pub(crate) destinations: HashMap<PendingCategory, Arc<dyn SyncDestination>>,
    pub(crate) event_listeners: EventListeners<SyncEvent>,
    pub(crate) name: String,
}

/// Builder for [`PendingOperationQueue`].
pub struct PendingQueueBuilder {
    config: QueueConfig,
}

impl PendingQueueBuilder {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            config: QueueConfig {
                store,
                clock: Arc::new(SystemClock),
                error_log: None,
                destinations: HashMap::new(),
                event_listeners: EventListeners::new(),
                name: String::from("<unnamed>"),
            },
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.config.clock = clock;
        self
    }

    /// Records every failed category in `log`.
    pub fn error_log(mut self, log: ErrorLog) -> Self {
        self.config.error_log = Some(log);
        self
    }

    /// Registers where `category` entries are replayed to.
    ///
    /// Categories without a destination are never synced.
    pub fn destination<D>(mut self, category: PendingCategory, destination: D) -> Self
    where
        D: SyncDestination + 'static,
    {
        self.config
            .destinations
            .insert(category, Arc::new(destination));
        self
    }

    /// Like [`destination`](Self::destination) for an already shared client.
    pub fn shared_destination(
        mut self,
        category: PendingCategory,
        destination: Arc<dyn SyncDestination>,
    ) -> Self {
        self.config.destinations.insert(category, destination);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        self.config.event_listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> PendingOperationQueue {
        PendingOperationQueue::from_config(self.config)
    }
}
