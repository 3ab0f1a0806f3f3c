//! Configuration for the fallback cache.

use crate::events::CacheEvent;
use crate::FallbackCache;
use aynamoda_resilience_core::events::{EventListeners, FnListener};
use aynamoda_resilience_core::{Clock, KeyValueStore, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of cached daily recommendations.
pub const DEFAULT_RECOMMENDATIONS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default lifetime of cached weather.
pub const DEFAULT_WEATHER_TTL: Duration = Duration::from_secs(60 * 60);
/// Default lifetime of a cached wardrobe snapshot.
pub const DEFAULT_WARDROBE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Per-domain default TTLs, serialized in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheTtls {
    #[serde(with = "secs")]
    pub recommendations: Duration,
    #[serde(with = "secs")]
    pub weather: Duration,
    #[serde(with = "secs")]
    pub wardrobe: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            recommendations: DEFAULT_RECOMMENDATIONS_TTL,
            weather: DEFAULT_WEATHER_TTL,
            wardrobe: DEFAULT_WARDROBE_TTL,
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

pub(crate) struct CacheConfig {
    pub(crate) store: Arc<dyn KeyValueStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ttls: CacheTtls,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
    pub(crate) name: String,
}

/// Builder for [`FallbackCache`].
pub struct FallbackCacheBuilder {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttls: CacheTtls,
    event_listeners: EventListeners<CacheEvent>,
    name: String,
}

impl FallbackCacheBuilder {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttls: CacheTtls::default(),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Clock used for `cachedAt` and expiry checks.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces all domain TTLs.
    pub fn ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    /// Default: 24 hours.
    pub fn recommendations_ttl(mut self, ttl: Duration) -> Self {
        self.ttls.recommendations = ttl;
        self
    }

    /// Default: 1 hour.
    pub fn weather_ttl(mut self, ttl: Duration) -> Self {
        self.ttls.weather = ttl;
        self
    }

    /// Default: 24 hours.
    pub fn wardrobe_ttl(mut self, ttl: Duration) -> Self {
        self.ttls.wardrobe = ttl;
        self
    }

    /// Sets the name of this cache instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with the key on every fresh read.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Hit { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key on misses and expirations.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Miss { key, .. } | CacheEvent::Expired { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a listener for every cache event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    pub fn build(self) -> FallbackCache {
        FallbackCache::from_config(CacheConfig {
            store: self.store,
            clock: self.clock,
            ttls: self.ttls,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}
