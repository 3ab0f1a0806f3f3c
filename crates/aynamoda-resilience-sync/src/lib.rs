//! Persisted queue of user actions that failed to reach the backend.
//!
//! Feedback, notifications, and wardrobe edits that cannot be delivered are
//! appended to a per-category list in the device store. A later call to
//! [`PendingOperationQueue::sync_pending_operations`] (typically on app
//! foreground or when connectivity returns) replays each list to its
//! [`SyncDestination`].
//!
//! Categories are independent: a failing destination leaves its own list
//! untouched and does not stop the others. A list is only cleared once every
//! entry in it was accepted, so an entry may be delivered more than once
//! across passes. Destinations should use [`PendingOperation::id`] to ignore
//! replays.
//!
//! # Examples
//!
//! ```
//! use aynamoda_resilience_core::MemoryStore;
//! use aynamoda_resilience_sync::{
//!     FnDestination, PendingCategory, PendingOperation, PendingOperationQueue, SyncOutcome,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = PendingOperationQueue::builder(Arc::new(MemoryStore::new()))
//!     .destination(
//!         PendingCategory::Feedback,
//!         FnDestination::new(|op: PendingOperation| async move {
//!             println!("submitting feedback {}", op.id);
//!             Ok::<(), aynamoda_resilience_sync::BoxError>(())
//!         }),
//!     )
//!     .build();
//!
//! let op = PendingOperation::new("u1", serde_json::json!({"liked": true}), chrono::Utc::now());
//! queue.enqueue(PendingCategory::Feedback, op).await?;
//!
//! let report = queue.sync_pending_operations().await;
//! assert_eq!(
//!     report.outcome(PendingCategory::Feedback),
//!     Some(&SyncOutcome::Synced { count: 1 })
//! );
//! # Ok(())
//! # }
//! ```

mod config;
mod destination;
mod error;
mod events;
mod operation;
mod report;

pub use config::PendingQueueBuilder;
pub use destination::{FnDestination, SyncDestination};
pub use error::{BoxError, SyncError};
pub use events::SyncEvent;
pub use operation::{PendingCategory, PendingOperation};
pub use report::{SyncOutcome, SyncReport};

use aynamoda_resilience_core::{load_json, store_json, KeyValueStore, OperationContext, StorageError};
use config::QueueConfig;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

struct Shared {
    config: QueueConfig,
    // Serializes read-modify-write of the lists within this process. Never
    // held across a destination call.
    write_lock: Mutex<()>,
    // One sync pass at a time, so overlapping passes do not resubmit the
    // same snapshot.
    sync_lock: Mutex<()>,
}

/// Queue of pending user actions, one persisted list per [`PendingCategory`].
///
/// Cheap to clone; clones share destinations and locks.
#[derive(Clone)]
pub struct PendingOperationQueue {
    shared: Arc<Shared>,
}

impl PendingOperationQueue {
    pub fn builder(store: Arc<dyn KeyValueStore>) -> PendingQueueBuilder {
        PendingQueueBuilder::new(store)
    }

    pub(crate) fn from_config(config: QueueConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "pending_sync_total",
                "Total number of category sync attempts by outcome"
            );
            describe_counter!("pending_enqueued_total", "Total number of queued operations");
        });

        Self {
            shared: Arc::new(Shared {
                config,
                write_lock: Mutex::new(()),
                sync_lock: Mutex::new(()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    /// `true` if `category` has a registered destination.
    pub fn has_destination(&self, category: PendingCategory) -> bool {
        self.shared.config.destinations.contains_key(&category)
    }

    /// Appends `operation` to the category's list.
    ///
    /// A list that no longer parses is replaced rather than blocking new
    /// entries forever.
    pub async fn enqueue(
        &self,
        category: PendingCategory,
        operation: PendingOperation,
    ) -> Result<(), StorageError> {
        let config = &self.shared.config;
        let _guard = self.shared.write_lock.lock().await;

        let mut operations = match self.pending(category).await {
            Ok(operations) => operations,
            Err(StorageError::Serialization { source, .. }) => {
                tracing::warn!(%category, error = %source, "discarding unreadable pending list");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let operation_id = operation.id.clone();
        operations.push(operation);
        store_json(config.store.as_ref(), category.key(), &operations).await?;

        tracing::debug!(%category, operation_id = %operation_id, queued = operations.len(), "queued pending operation");

        #[cfg(feature = "metrics")]
        counter!("pending_enqueued_total", "category" => category.as_str()).increment(1);

        config.event_listeners.emit(&SyncEvent::Enqueued {
            source: config.name.clone(),
            timestamp: config.clock.now(),
            category,
            operation_id,
        });
        Ok(())
    }

    /// Entries currently queued for `category`, oldest first.
    pub async fn pending(
        &self,
        category: PendingCategory,
    ) -> Result<Vec<PendingOperation>, StorageError> {
        let store = self.shared.config.store.as_ref();
        Ok(load_json(store, category.key()).await?.unwrap_or_default())
    }

    /// Replays every non-empty category to its destination.
    ///
    /// Never fails as a whole; the report says what happened per category.
    /// Enqueueing stays available while destinations are being called.
    /// Entries queued meanwhile are kept for the next pass.
    pub async fn sync_pending_operations(&self) -> SyncReport {
        let _pass = self.shared.sync_lock.lock().await;

        let mut report = SyncReport::default();
        for category in PendingCategory::ALL {
            let outcome = self.sync_category(category).await;

            #[cfg(feature = "metrics")]
            counter!(
                "pending_sync_total",
                "category" => category.as_str(),
                "result" => match &outcome {
                    SyncOutcome::Synced { .. } => "synced",
                    SyncOutcome::Empty => "empty",
                    SyncOutcome::NoDestination => "no_destination",
                    SyncOutcome::Failed { .. } => "failed",
                }
            )
            .increment(1);

            report.push(category, outcome);
        }
        report
    }

    async fn sync_category(&self, category: PendingCategory) -> SyncOutcome {
        let config = &self.shared.config;
        let Some(destination) = config.destinations.get(&category) else {
            tracing::trace!(%category, "no sync destination registered");
            return SyncOutcome::NoDestination;
        };

        match self.replay(category, destination.as_ref()).await {
            Ok(0) => SyncOutcome::Empty,
            Ok(count) => {
                tracing::info!(%category, count, "synced pending operations");
                config.event_listeners.emit(&SyncEvent::Synced {
                    source: config.name.clone(),
                    timestamp: config.clock.now(),
                    category,
                    count,
                });
                SyncOutcome::Synced { count }
            }
            Err(error) => {
                let message = format!("Failed to sync pending {}: {}", category, error);
                tracing::warn!(%category, %error, "{}", message);

                if let Some(log) = &config.error_log {
                    let context = OperationContext::new("sync", "syncPendingOperations");
                    if let Err(e) = log.record(&context, message).await {
                        tracing::debug!(error = %e, "could not record sync failure");
                    }
                }

                config.event_listeners.emit(&SyncEvent::Failed {
                    source: config.name.clone(),
                    timestamp: config.clock.now(),
                    category,
                    error: error.to_string(),
                });
                SyncOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    async fn replay(
        &self,
        category: PendingCategory,
        destination: &dyn SyncDestination,
    ) -> Result<usize, SyncError> {
        let operations = {
            let _guard = self.shared.write_lock.lock().await;
            self.pending(category).await?
        };
        if operations.is_empty() {
            return Ok(0);
        }

        for operation in &operations {
            destination
                .submit(operation)
                .await
                .map_err(|source| SyncError::Destination {
                    category,
                    operation_id: operation.id.clone(),
                    source,
                })?;
        }

        self.remove_synced(category, &operations).await?;
        Ok(operations.len())
    }

    /// Drops the delivered entries, keeping anything queued since the snapshot.
    async fn remove_synced(
        &self,
        category: PendingCategory,
        synced: &[PendingOperation],
    ) -> Result<(), StorageError> {
        let store = self.shared.config.store.as_ref();
        let _guard = self.shared.write_lock.lock().await;

        let delivered: HashSet<&str> = synced.iter().map(|op| op.id.as_str()).collect();
        let remaining: Vec<PendingOperation> = self
            .pending(category)
            .await?
            .into_iter()
            .filter(|op| !delivered.contains(op.id.as_str()))
            .collect();

        if remaining.is_empty() {
            store.remove_item(category.key()).await
        } else {
            tracing::debug!(%category, kept = remaining.len(), "entries queued during sync kept");
            store_json(store, category.key(), &remaining).await
        }
    }
}

impl std::fmt::Debug for PendingOperationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut destinations: Vec<_> = self.shared.config.destinations.keys().collect();
        destinations.sort_by_key(|c| c.key());
        f.debug_struct("PendingOperationQueue")
            .field("name", &self.shared.config.name)
            .field("destinations", &destinations)
            .finish_non_exhaustive()
    }
}
