//! Error types for device-local storage.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore).
///
/// Callers in the resilience layer never surface these to the UI: the cache
/// treats them as misses and the error log swallows them. They exist so the
/// secondary paths (in-app notification, critical escalation) can tell a
/// failed write from a successful one.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store rejected or could not complete the operation.
    #[error("storage backend error on `{key}`: {message}")]
    Backend {
        /// Key the operation targeted.
        key: String,
        /// Backend-provided description.
        message: String,
    },

    /// A stored value could not be encoded or decoded as JSON.
    #[error("invalid JSON under `{key}`: {source}")]
    Serialization {
        /// Key the value was stored under.
        key: String,
        /// Underlying parse or encode failure.
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure in a file-backed store.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Convenience constructor for backend failures.
    pub fn backend(key: impl Into<String>, message: impl Into<String>) -> Self {
        StorageError::Backend {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Wraps a JSON failure for the given key.
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        StorageError::Serialization {
            key: key.into(),
            source,
        }
    }
}
