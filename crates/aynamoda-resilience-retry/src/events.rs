use aynamoda_resilience_core::events::ResilienceEvent;
use aynamoda_resilience_core::OperationContext;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Events emitted by the retry executor.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// An attempt failed and another will follow after `delay`.
    Retry {
        source: String,
        timestamp: DateTime<Utc>,
        context: OperationContext,
        /// 0-indexed retry number.
        attempt: usize,
        delay: Duration,
    },
    /// The operation succeeded after `attempts` invocations.
    Success {
        source: String,
        timestamp: DateTime<Utc>,
        context: OperationContext,
        attempts: usize,
    },
    /// Every allowed attempt failed; the last error goes back to the caller.
    Exhausted {
        source: String,
        timestamp: DateTime<Utc>,
        context: OperationContext,
        attempts: usize,
    },
    /// The predicate marked the error permanent; no retry was made.
    Ignored {
        source: String,
        timestamp: DateTime<Utc>,
        context: OperationContext,
        attempts: usize,
    },
    /// The caller cancelled before the operation finished.
    Cancelled {
        source: String,
        timestamp: DateTime<Utc>,
        context: OperationContext,
        attempts: usize,
    },
}

impl RetryEvent {
    /// Call site the event refers to.
    pub fn context(&self) -> &OperationContext {
        match self {
            RetryEvent::Retry { context, .. }
            | RetryEvent::Success { context, .. }
            | RetryEvent::Exhausted { context, .. }
            | RetryEvent::Ignored { context, .. }
            | RetryEvent::Cancelled { context, .. } => context,
        }
    }
}

impl ResilienceEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::Ignored { .. } => "ignored",
            RetryEvent::Cancelled { .. } => "cancelled",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::Ignored { timestamp, .. }
            | RetryEvent::Cancelled { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            RetryEvent::Retry { source, .. }
            | RetryEvent::Success { source, .. }
            | RetryEvent::Exhausted { source, .. }
            | RetryEvent::Ignored { source, .. }
            | RetryEvent::Cancelled { source, .. } => source,
        }
    }
}
