//! Error type for cancellable retries.

use std::fmt;

/// Outcome of a retry sequence that can be cancelled.
///
/// [`RetryExecutor::execute_with_retry`](crate::RetryExecutor::execute_with_retry)
/// returns the operation's own error unchanged; only the cancellable entry
/// point needs this wrapper.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The operation failed and no further attempt is allowed.
    Operation(E),

    /// The caller cancelled the sequence.
    Cancelled {
        /// Attempts that completed (or were in flight) before cancellation.
        attempts: usize,
    },
}

impl<E> RetryError<E> {
    /// Returns `true` if the sequence was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The operation error, if the sequence ran to exhaustion.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Cancelled { .. } => None,
        }
    }

    /// Maps the operation error.
    pub fn map<F, U>(self, f: F) -> RetryError<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            Self::Operation(e) => RetryError::Operation(f(e)),
            Self::Cancelled { attempts } => RetryError::Cancelled { attempts },
        }
    }
}

impl<E: Clone> Clone for RetryError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Operation(e) => Self::Operation(e.clone()),
            Self::Cancelled { attempts } => Self::Cancelled {
                attempts: *attempts,
            },
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(e) => write!(f, "{}", e),
            Self::Cancelled { attempts } => {
                write!(f, "retry cancelled after {} attempt(s)", attempts)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Operation(e) => Some(e),
            Self::Cancelled { .. } => None,
        }
    }
}
