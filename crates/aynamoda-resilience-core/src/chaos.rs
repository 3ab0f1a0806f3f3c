//! Fault injection for storage.
//!
//! [`ChaosStore`] wraps another [`KeyValueStore`] and fails selected
//! operations on demand, so the degraded paths (cache misses on read errors,
//! in-app notification when the pending queue cannot be written, critical
//! escalation) can be exercised without a broken device.

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Which keys an injected fault applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FaultScope {
    /// Operations pass through.
    #[default]
    Off,
    /// Every key fails.
    All,
    /// Only the listed keys fail.
    Keys(HashSet<String>),
}

impl FaultScope {
    /// Scope covering exactly the given keys.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FaultScope::Keys(keys.into_iter().map(Into::into).collect())
    }

    fn covers(&self, key: &str) -> bool {
        match self {
            FaultScope::Off => false,
            FaultScope::All => true,
            FaultScope::Keys(keys) => keys.contains(key),
        }
    }
}

#[derive(Debug, Default)]
struct Faults {
    reads: FaultScope,
    writes: FaultScope,
    removes: FaultScope,
}

/// A store wrapper that fails configured operations.
pub struct ChaosStore {
    inner: Arc<dyn KeyValueStore>,
    faults: Mutex<Faults>,
    injected: AtomicUsize,
}

impl ChaosStore {
    /// Wraps `inner` with all faults switched off.
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner,
            faults: Mutex::new(Faults::default()),
            injected: AtomicUsize::new(0),
        }
    }

    /// Fails `get_item` for keys in `scope`.
    pub fn fail_reads(&self, scope: FaultScope) {
        self.faults.lock().reads = scope;
    }

    /// Fails `set_item` for keys in `scope`.
    pub fn fail_writes(&self, scope: FaultScope) {
        self.faults.lock().writes = scope;
    }

    /// Fails `remove_item` for keys in `scope`.
    pub fn fail_removes(&self, scope: FaultScope) {
        self.faults.lock().removes = scope;
    }

    /// Switches every fault off.
    pub fn heal(&self) {
        *self.faults.lock() = Faults::default();
    }

    /// Number of operations failed so far.
    pub fn injected_faults(&self) -> usize {
        self.injected.load(Ordering::SeqCst)
    }

    fn inject(&self, op: &str, key: &str) -> StorageError {
        self.injected.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(key, op, "injecting storage fault");
        StorageError::backend(key, format!("injected {op} failure"))
    }
}

impl KeyValueStore for ChaosStore {
    fn get_item<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        if self.faults.lock().reads.covers(key) {
            let err = self.inject("read", key);
            return Box::pin(futures::future::ready(Err(err)));
        }
        self.inner.get_item(key)
    }

    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: String,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        if self.faults.lock().writes.covers(key) {
            let err = self.inject("write", key);
            return Box::pin(futures::future::ready(Err(err)));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        if self.faults.lock().removes.covers(key) {
            let err = self.inject("remove", key);
            return Box::pin(futures::future::ready(Err(err)));
        }
        self.inner.remove_item(key)
    }
}
