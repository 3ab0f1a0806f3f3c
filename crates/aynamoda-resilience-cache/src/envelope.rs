//! On-disk shape of cached values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What [`FallbackCache::cache`](crate::FallbackCache::cache) writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope<T> {
    pub payload: T,
    pub cached_at: DateTime<Utc>,
    /// `None` means the entry never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl<T> CacheEnvelope<T> {
    pub fn new(payload: T, cached_at: DateTime<Utc>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            payload,
            cached_at,
            expires_at,
        }
    }

    /// `true` once `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }
}

/// Result of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    /// Nothing usable under the key. Storage and parse failures land here too.
    Missing,
    Fresh(T),
    /// The entry was past its expiry and has been removed.
    Expired,
}

impl<T> CacheLookup<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, CacheLookup::Fresh(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Fresh(value) => Some(value),
            CacheLookup::Missing | CacheLookup::Expired => None,
        }
    }

    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            CacheLookup::Missing => "miss",
            CacheLookup::Fresh(_) => "hit",
            CacheLookup::Expired => "expired",
        }
    }
}

/// A stored value split into its payload and expiry.
///
/// Older app builds wrote `{ data, timestamp }` or the bare value, so the
/// payload is taken from `payload`, then `data`, then the whole object.
pub(crate) struct RawEntry {
    pub(crate) payload: Value,
    pub(crate) expiry: Expiry,
}

/// The `expiresAt` field as found in storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Expiry {
    /// Absent or `null`.
    Never,
    At(DateTime<Utc>),
    /// Present but not a timestamp. Such an entry is never served.
    Unreadable,
}

impl Expiry {
    pub(crate) fn is_past(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(expires_at) => now > *expires_at,
            Expiry::Unreadable => true,
        }
    }
}

impl RawEntry {
    pub(crate) fn decode(value: Value) -> Self {
        let mut value = value;
        let expiry = match value.get("expiresAt") {
            None | Some(Value::Null) => Expiry::Never,
            Some(raw) => parse_instant(raw).map_or(Expiry::Unreadable, Expiry::At),
        };

        let payload = match value.as_object_mut() {
            Some(object) if object.contains_key("payload") => object.remove("payload"),
            Some(object) if object.contains_key("data") => object.remove("data"),
            _ => None,
        };

        Self {
            payload: payload.unwrap_or(value),
            expiry,
        }
    }
}

/// Accepts RFC 3339 strings or integral epoch milliseconds.
fn parse_instant(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}
