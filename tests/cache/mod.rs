//! Tests for the fallback cache.
//!
//! Test organization:
//! - cache_expiry.rs: fresh, expired, and missing entries
//! - cache_domain.rs: recommendations, weather, and wardrobe helpers
//! - cache_storage.rs: failing stores, the file store, legacy entry shapes

mod cache_domain;

use aynamoda_resilience_core::ManualClock;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

pub(crate) fn morning_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap(),
    ))
}
