//! Persisted, size-capped failure log.
//!
//! Every failed attempt the resilience layer observes becomes one
//! [`ErrorLogEntry`] under [`keys::ERROR_LOGS`]. The log is capped; once full,
//! the oldest entries are dropped first.

use crate::clock::Clock;
use crate::context::OperationContext;
use crate::error::StorageError;
use crate::keys;
use crate::storage::{load_json, store_json, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of entries retained.
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 100;

/// Marker prefixed to entries that need manual follow-up.
pub const CRITICAL_MARKER: &str = "CRITICAL ERROR";

/// How urgently an entry needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A recoverable failure that was retried or substituted.
    #[default]
    Error,
    /// Primary and secondary channels both failed.
    Critical,
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogEntry {
    pub service: String,
    pub operation: String,
    pub timestamp: DateTime<Utc>,
    pub error_message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl ErrorLogEntry {
    /// True for entries carrying the critical marker.
    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Append-only log with FIFO eviction, persisted through a [`KeyValueStore`].
#[derive(Clone)]
pub struct ErrorLog {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    capacity: usize,
}

impl ErrorLog {
    /// Creates a log with [`DEFAULT_ERROR_LOG_CAPACITY`].
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(store, clock, DEFAULT_ERROR_LOG_CAPACITY)
    }

    /// Creates a log retaining at most `capacity` entries (minimum 1).
    pub fn with_capacity(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        capacity: usize,
    ) -> Self {
        Self {
            store,
            clock,
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a recoverable failure.
    pub async fn record(
        &self,
        context: &OperationContext,
        message: impl Into<String>,
    ) -> Result<ErrorLogEntry, StorageError> {
        let message = message.into();
        tracing::warn!(
            service = %context.service,
            operation = %context.operation,
            error = %message,
            "operation failed"
        );
        self.append(context, message, Severity::Error).await
    }

    /// Records a failure that needs manual follow-up.
    ///
    /// The stored message is prefixed with [`CRITICAL_MARKER`].
    pub async fn record_critical(
        &self,
        context: &OperationContext,
        message: impl Into<String>,
    ) -> Result<ErrorLogEntry, StorageError> {
        let message = format!("{}: {}", CRITICAL_MARKER, message.into());
        tracing::error!(
            service = %context.service,
            operation = %context.operation,
            error = %message,
            "critical failure requires manual follow-up"
        );
        self.append(context, message, Severity::Critical).await
    }

    /// Builds the entry that [`record`](Self::record) or
    /// [`record_critical`](Self::record_critical) would persist, without
    /// touching storage.
    pub fn entry(
        &self,
        context: &OperationContext,
        message: impl Into<String>,
        severity: Severity,
    ) -> ErrorLogEntry {
        ErrorLogEntry {
            service: context.service.clone(),
            operation: context.operation.clone(),
            timestamp: self.clock.now(),
            error_message: message.into(),
            severity,
        }
    }

    /// Current entries, oldest first.
    ///
    /// A corrupt log reads as empty.
    pub async fn entries(&self) -> Result<Vec<ErrorLogEntry>, StorageError> {
        match load_json::<Vec<ErrorLogEntry>>(self.store.as_ref(), keys::ERROR_LOGS).await {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(StorageError::Serialization { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Drops every entry.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove_item(keys::ERROR_LOGS).await
    }

    async fn append(
        &self,
        context: &OperationContext,
        message: String,
        severity: Severity,
    ) -> Result<ErrorLogEntry, StorageError> {
        let entry = self.entry(context, message, severity);
        let mut entries = self.entries().await?;
        entries.push(entry.clone());
        if entries.len() > self.capacity {
            let overflow = entries.len() - self.capacity;
            entries.drain(..overflow);
        }
        store_json(self.store.as_ref(), keys::ERROR_LOGS, &entries).await?;
        Ok(entry)
    }
}

impl std::fmt::Debug for ErrorLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLog")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
