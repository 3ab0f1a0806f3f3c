use crate::PendingCategory;
use aynamoda_resilience_core::events::ResilienceEvent;
use chrono::{DateTime, Utc};

/// Events emitted by [`PendingOperationQueue`](crate::PendingOperationQueue).
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Enqueued {
        source: String,
        timestamp: DateTime<Utc>,
        category: PendingCategory,
        operation_id: String,
    },
    /// Every entry of the category was accepted and the list was cleared.
    Synced {
        source: String,
        timestamp: DateTime<Utc>,
        category: PendingCategory,
        count: usize,
    },
    /// The category's list was left untouched.
    Failed {
        source: String,
        timestamp: DateTime<Utc>,
        category: PendingCategory,
        error: String,
    },
}

impl SyncEvent {
    pub fn category(&self) -> PendingCategory {
        match self {
            SyncEvent::Enqueued { category, .. }
            | SyncEvent::Synced { category, .. }
            | SyncEvent::Failed { category, .. } => *category,
        }
    }
}

impl ResilienceEvent for SyncEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::Enqueued { .. } => "enqueued",
            SyncEvent::Synced { .. } => "synced",
            SyncEvent::Failed { .. } => "failed",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SyncEvent::Enqueued { timestamp, .. }
            | SyncEvent::Synced { timestamp, .. }
            | SyncEvent::Failed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            SyncEvent::Enqueued { source, .. }
            | SyncEvent::Synced { source, .. }
            | SyncEvent::Failed { source, .. } => source,
        }
    }
}
