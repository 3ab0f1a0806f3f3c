//! Time-bounded fallback cache for the AYNAMODA resilience layer.
//!
//! [`FallbackCache`] keeps the last good value of things the app can show
//! while offline: daily recommendations, current weather, and the wardrobe
//! snapshot. Values are stored as a [`CacheEnvelope`] through a
//! [`KeyValueStore`] and are never served past their expiry.
//!
//! Reads never fail. A missing key, a storage error, or unparseable JSON all
//! come back as a miss.
//!
//! # Examples
//!
//! ```
//! use aynamoda_resilience_cache::FallbackCache;
//! use aynamoda_resilience_core::MemoryStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
//!     .weather_ttl(Duration::from_secs(15 * 60))
//!     .name("device-cache")
//!     .build();
//!
//! cache.cache("greeting", &"hello", Some(Duration::from_secs(60))).await?;
//! let greeting: Option<String> = cache.get_cached("greeting").await;
//! assert_eq!(greeting.as_deref(), Some("hello"));
//! # Ok(())
//! # }
//! ```

mod config;
mod envelope;
mod events;

pub use config::{
    CacheTtls, FallbackCacheBuilder, DEFAULT_RECOMMENDATIONS_TTL, DEFAULT_WARDROBE_TTL,
    DEFAULT_WEATHER_TTL,
};
pub use envelope::{CacheEnvelope, CacheLookup};
pub use events::CacheEvent;

use aynamoda_resilience_core::{
    keys, DailyRecommendations, KeyValueStore, StorageError, WardrobeItem, WeatherContext,
};
use chrono::{DateTime, NaiveDate, Utc};
use config::CacheConfig;
use envelope::RawEntry;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Expiring cache over a device-local store.
///
/// Cheap to clone; clones share the store and listeners.
#[derive(Clone)]
pub struct FallbackCache {
    config: Arc<CacheConfig>,
}

impl FallbackCache {
    /// Creates a builder writing to `store`.
    pub fn builder(store: Arc<dyn KeyValueStore>) -> FallbackCacheBuilder {
        FallbackCacheBuilder::new(store)
    }

    pub(crate) fn from_config(config: CacheConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!(
                "fallback_cache_lookups_total",
                "Total number of fallback cache reads by result (hit, miss, expired)"
            );
            describe_counter!("fallback_cache_writes_total", "Total number of fallback cache writes");
        });

        Self {
            config: Arc::new(config),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn ttls(&self) -> &CacheTtls {
        &self.config.ttls
    }

    /// Stores `value` under `key`, expiring after `ttl` if given.
    pub async fn cache<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let now = self.config.clock.now();
        let envelope = CacheEnvelope::new(value, now, ttl.and_then(|ttl| expiry(now, ttl)));

        let result = match serde_json::to_string(&envelope) {
            Ok(raw) => self.config.store.set_item(key, raw).await,
            Err(e) => Err(StorageError::serialization(key, e)),
        };

        #[cfg(feature = "metrics")]
        counter!(
            "fallback_cache_writes_total",
            "cache" => self.config.name.clone(),
            "result" => if result.is_ok() { "stored" } else { "failed" }
        )
        .increment(1);

        let event = match &result {
            Ok(()) => {
                tracing::debug!(cache = %self.config.name, key, "cached value");
                CacheEvent::Stored {
                    source: self.config.name.clone(),
                    timestamp: now,
                    key: key.to_string(),
                }
            }
            Err(error) => {
                tracing::warn!(cache = %self.config.name, key, %error, "failed to cache value");
                CacheEvent::WriteFailed {
                    source: self.config.name.clone(),
                    timestamp: now,
                    key: key.to_string(),
                    error: error.to_string(),
                }
            }
        };
        self.config.event_listeners.emit(&event);

        result
    }

    /// The fresh value under `key`, if any.
    pub async fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(key).await.into_option()
    }

    /// Reads `key`, distinguishing a missing entry from an expired one.
    ///
    /// Expired entries are removed as a side effect. An `expiresAt` that is
    /// not a timestamp counts as expired.
    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let result = self.read(key).await;

        #[cfg(feature = "metrics")]
        counter!(
            "fallback_cache_lookups_total",
            "cache" => self.config.name.clone(),
            "result" => result.outcome()
        )
        .increment(1);

        let source = self.config.name.clone();
        let timestamp = self.config.clock.now();
        let key = key.to_string();
        let event = match &result {
            CacheLookup::Fresh(_) => CacheEvent::Hit {
                source,
                timestamp,
                key,
            },
            CacheLookup::Missing => CacheEvent::Miss {
                source,
                timestamp,
                key,
            },
            CacheLookup::Expired => CacheEvent::Expired {
                source,
                timestamp,
                key,
            },
        };
        tracing::trace!(cache = %self.config.name, key = event.key(), result = result.outcome(), "cache lookup");
        self.config.event_listeners.emit(&event);

        result
    }

    /// Removes `key`.
    pub async fn invalidate(&self, key: &str) -> Result<(), StorageError> {
        self.config.store.remove_item(key).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let raw = match self.config.store.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheLookup::Missing,
            Err(error) => {
                tracing::debug!(cache = %self.config.name, key, %error, "cache read failed");
                return CacheLookup::Missing;
            }
        };

        let entry = match serde_json::from_str(&raw) {
            Ok(value) => RawEntry::decode(value),
            Err(error) => {
                tracing::debug!(cache = %self.config.name, key, %error, "cache entry is not JSON");
                return CacheLookup::Missing;
            }
        };

        if entry.expiry.is_past(self.config.clock.now()) {
            if let Err(error) = self.config.store.remove_item(key).await {
                tracing::debug!(cache = %self.config.name, key, %error, "failed to remove expired entry");
            }
            return CacheLookup::Expired;
        }

        match serde_json::from_value(entry.payload) {
            Ok(value) => CacheLookup::Fresh(value),
            Err(error) => {
                tracing::debug!(cache = %self.config.name, key, %error, "cache payload has unexpected shape");
                CacheLookup::Missing
            }
        }
    }

    /// Caches the day's recommendations under `recommendations_{user}[_{date}]`.
    pub async fn cache_recommendations(
        &self,
        user_id: &str,
        recommendations: &DailyRecommendations,
        date: Option<NaiveDate>,
    ) -> Result<(), StorageError> {
        let ttl = self.config.ttls.recommendations;
        self.cache(&keys::recommendations(user_id, date), recommendations, Some(ttl))
            .await
    }

    pub async fn get_cached_recommendations(
        &self,
        user_id: &str,
        date: Option<NaiveDate>,
    ) -> Option<DailyRecommendations> {
        self.get_cached(&keys::recommendations(user_id, date)).await
    }

    /// Caches weather under `weather_{user}`.
    pub async fn cache_weather(
        &self,
        user_id: &str,
        weather: &WeatherContext,
    ) -> Result<(), StorageError> {
        let ttl = self.config.ttls.weather;
        self.cache(&keys::weather(user_id), weather, Some(ttl)).await
    }

    pub async fn get_cached_weather(&self, user_id: &str) -> Option<WeatherContext> {
        self.get_cached(&keys::weather(user_id)).await
    }

    /// Caches a wardrobe snapshot under `wardrobe_{user}`.
    pub async fn cache_wardrobe(
        &self,
        user_id: &str,
        items: &[WardrobeItem],
    ) -> Result<(), StorageError> {
        let ttl = self.config.ttls.wardrobe;
        self.cache(&keys::wardrobe(user_id), items, Some(ttl)).await
    }

    pub async fn get_cached_wardrobe(&self, user_id: &str) -> Option<Vec<WardrobeItem>> {
        self.get_cached(&keys::wardrobe(user_id)).await
    }
}

impl std::fmt::Debug for FallbackCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackCache")
            .field("name", &self.config.name)
            .field("ttls", &self.config.ttls)
            .finish_non_exhaustive()
    }
}

/// `None` when the TTL is too large to represent, meaning no expiry.
fn expiry(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
}
