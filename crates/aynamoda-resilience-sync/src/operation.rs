use aynamoda_resilience_core::keys;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of user action that are queued when their backend call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PendingCategory {
    Feedback,
    Notifications,
    WardrobeUpdates,
}

impl PendingCategory {
    /// Every category, in sync order.
    pub const ALL: [PendingCategory; 3] = [
        PendingCategory::Feedback,
        PendingCategory::Notifications,
        PendingCategory::WardrobeUpdates,
    ];

    /// Storage key holding this category's list.
    pub fn key(self) -> &'static str {
        match self {
            PendingCategory::Feedback => keys::PENDING_FEEDBACK,
            PendingCategory::Notifications => keys::PENDING_NOTIFICATIONS,
            PendingCategory::WardrobeUpdates => keys::PENDING_WARDROBE_UPDATES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PendingCategory::Feedback => "feedback",
            PendingCategory::Notifications => "notifications",
            PendingCategory::WardrobeUpdates => "wardrobe updates",
        }
    }
}

impl fmt::Display for PendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued user action.
///
/// `payload` is whatever the original backend call would have sent. `id` lets
/// a destination drop replays of an entry it has already accepted. Entries
/// stored without an id get one derived from their content, so every read
/// of the same entry yields the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredOperation")]
pub struct PendingOperation {
    pub id: String,
    pub user_id: String,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PendingOperation {
    pub fn new(
        user_id: impl Into<String>,
        payload: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            payload,
            timestamp,
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Namespace for ids derived from entries persisted without one.
const LEGACY_ID_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6f1c_2a7e_93d4_4b58_a0e1_5c37_d2f8_9b46);

/// On-disk shape; `id` is absent in lists written by older app versions.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredOperation {
    id: Option<String>,
    user_id: String,
    payload: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl From<StoredOperation> for PendingOperation {
    fn from(stored: StoredOperation) -> Self {
        let id = match stored.id {
            Some(id) => id,
            None => content_id(&stored.user_id, &stored.payload, stored.timestamp),
        };
        Self {
            id,
            user_id: stored.user_id,
            payload: stored.payload,
            timestamp: stored.timestamp,
        }
    }
}

// serde_json orders object keys, so equal payloads serialize identically.
fn content_id(user_id: &str, payload: &serde_json::Value, timestamp: DateTime<Utc>) -> String {
    let name = format!("{}\n{}\n{}", user_id, timestamp.to_rfc3339(), payload);
    uuid::Uuid::new_v5(&LEGACY_ID_NAMESPACE, name.as_bytes()).to_string()
}
