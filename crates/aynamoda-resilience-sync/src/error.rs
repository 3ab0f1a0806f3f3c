use crate::PendingCategory;
use aynamoda_resilience_core::StorageError;
use thiserror::Error;

/// Boxed error returned by a [`SyncDestination`](crate::SyncDestination).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a category could not be synced.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The destination rejected an entry.
    #[error("destination rejected {category} entry {operation_id}: {source}")]
    Destination {
        category: PendingCategory,
        operation_id: String,
        #[source]
        source: BoxError,
    },

    /// The pending list could not be read or cleared.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
