//! Tests for the service error handlers.
//!
//! Test organization:
//! - weather.rs: cached and seasonal weather substitutes
//! - outfits.rs: rule-based and emergency outfit picks
//! - notifications.rs: queue, in-app, and critical escalation
//! - queued_actions.rs: feedback and wardrobe edits

mod notifications;

use aynamoda_resilience_core::ManualClock;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

pub(crate) fn clock_at(year: i32, month: u32, day: u32) -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap(),
    ))
}
