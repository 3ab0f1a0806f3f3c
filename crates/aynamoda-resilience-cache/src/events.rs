use aynamoda_resilience_core::events::ResilienceEvent;
use chrono::{DateTime, Utc};

/// Events emitted by [`FallbackCache`](crate::FallbackCache).
#[derive(Debug, Clone)]
pub enum CacheEvent {
    Hit {
        source: String,
        timestamp: DateTime<Utc>,
        key: String,
    },
    /// No entry, or the entry could not be read or parsed.
    Miss {
        source: String,
        timestamp: DateTime<Utc>,
        key: String,
    },
    /// The entry was stale and has been removed.
    Expired {
        source: String,
        timestamp: DateTime<Utc>,
        key: String,
    },
    Stored {
        source: String,
        timestamp: DateTime<Utc>,
        key: String,
    },
    WriteFailed {
        source: String,
        timestamp: DateTime<Utc>,
        key: String,
        error: String,
    },
}

impl CacheEvent {
    pub fn key(&self) -> &str {
        match self {
            CacheEvent::Hit { key, .. }
            | CacheEvent::Miss { key, .. }
            | CacheEvent::Expired { key, .. }
            | CacheEvent::Stored { key, .. }
            | CacheEvent::WriteFailed { key, .. } => key,
        }
    }
}

impl ResilienceEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "hit",
            CacheEvent::Miss { .. } => "miss",
            CacheEvent::Expired { .. } => "expired",
            CacheEvent::Stored { .. } => "stored",
            CacheEvent::WriteFailed { .. } => "write_failed",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Expired { timestamp, .. }
            | CacheEvent::Stored { timestamp, .. }
            | CacheEvent::WriteFailed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            CacheEvent::Hit { source, .. }
            | CacheEvent::Miss { source, .. }
            | CacheEvent::Expired { source, .. }
            | CacheEvent::Stored { source, .. }
            | CacheEvent::WriteFailed { source, .. } => source,
        }
    }
}
