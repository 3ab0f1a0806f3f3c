//! Device-local key-value storage.
//!
//! Everything the resilience layer persists (error log, cache envelopes,
//! pending operations) goes through [`KeyValueStore`]. Values are always JSON
//! strings; [`load_json`] and [`store_json`] handle the encoding.

use crate::error::StorageError;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Asynchronous string key-value store.
///
/// Mirrors the three calls the mobile storage API exposes. Implementations do
/// not need to provide transactions: concurrent read-modify-write on the same
/// key is last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value under `key`, or `None` if absent.
    fn get_item<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: String,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Reads and decodes the JSON value stored under `key`.
pub async fn load_json<T>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    match store.get_item(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::serialization(key, e)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and writes it under `key`.
pub async fn store_json<T>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|e| StorageError::serialization(key, e))?;
    store.set_item(key, raw).await
}

/// In-process store backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` currently holds a value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Sorted list of stored keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        let value = self.entries.lock().get(key).cloned();
        Box::pin(futures::future::ready(Ok(value)))
    }

    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: String,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        self.entries.lock().insert(key.to_string(), value);
        Box::pin(futures::future::ready(Ok(())))
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        self.entries.lock().remove(key);
        Box::pin(futures::future::ready(Ok(())))
    }
}

/// Persistent store holding every key in a single JSON document on disk.
///
/// The document is loaded on first access and rewritten (write to a sibling
/// temp file, then rename) on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    state: tokio::sync::Mutex<Option<HashMap<String, String>>>,
}

impl JsonFileStore {
    /// Creates a store persisting to `path`. The file is created lazily.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: tokio::sync::Mutex::new(None),
        }
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<HashMap<String, String>, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError::serialization(self.path.display().to_string(), e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write_document(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::serialization(self.path.display().to_string(), e))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, raw).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn mutate<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_document().await?);
        }
        let mut next = (*guard).clone().unwrap_or_default();
        f(&mut next);
        self.write_document(&next).await?;
        *guard = Some(next);
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_item<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<String>, StorageError>> {
        Box::pin(async move {
            let mut guard = self.state.lock().await;
            if guard.is_none() {
                *guard = Some(self.read_document().await?);
            }
            Ok(guard.as_ref().and_then(|entries| entries.get(key).cloned()))
        })
    }

    fn set_item<'a>(
        &'a self,
        key: &'a str,
        value: String,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.mutate(|entries| {
                entries.insert(key.to_string(), value);
            })
            .await
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            self.mutate(|entries| {
                entries.remove(key);
            })
            .await
        })
    }
}
