//! Storage key conventions.
//!
//! These strings are the de facto schema of the device store; changing one
//! orphans data written by older builds.

use chrono::NaiveDate;

/// Persisted, capped error log.
pub const ERROR_LOGS: &str = "error_logs";
/// Notifications that could not be scheduled.
pub const PENDING_NOTIFICATIONS: &str = "pending_notifications";
/// Outfit feedback that could not be submitted.
pub const PENDING_FEEDBACK: &str = "pending_feedback";
/// Wardrobe edits that could not be saved.
pub const PENDING_WARDROBE_UPDATES: &str = "pending_wardrobe_updates";

/// `recommendations_{user}` or `recommendations_{user}_{YYYY-MM-DD}`.
pub fn recommendations(user_id: &str, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("recommendations_{}_{}", user_id, date.format("%Y-%m-%d")),
        None => format!("recommendations_{}", user_id),
    }
}

/// `weather_{user}`.
pub fn weather(user_id: &str) -> String {
    format!("weather_{}", user_id)
}

/// `wardrobe_{user}`.
pub fn wardrobe(user_id: &str) -> String {
    format!("wardrobe_{}", user_id)
}
