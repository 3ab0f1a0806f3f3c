//! Copy shown to the user when a fallback kicks in.
//!
//! Nothing here mentions status codes, timeouts, or other technical detail.

use serde::{Deserialize, Serialize};

/// Which part of the app degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureContext {
    Network,
    Weather,
    Ai,
    Notification,
    Unknown,
}

impl FailureContext {
    /// Maps an [`OperationContext::service`](aynamoda_resilience_core::OperationContext) name.
    pub fn from_service(service: &str) -> Self {
        match service.to_ascii_lowercase().as_str() {
            "network" | "api" | "sync" => FailureContext::Network,
            "weather" => FailureContext::Weather,
            "ai" | "recommendation" | "recommendations" | "stylist" => FailureContext::Ai,
            "notification" | "notifications" => FailureContext::Notification,
            _ => FailureContext::Unknown,
        }
    }
}

pub fn user_friendly_message(context: FailureContext) -> &'static str {
    match context {
        FailureContext::Network => {
            "We're having trouble connecting right now. Your saved outfits and wardrobe are still available."
        }
        FailureContext::Weather => {
            "We couldn't get today's forecast, so we're styling with a seasonal estimate."
        }
        FailureContext::Ai => {
            "Our stylist is taking a short break. We've picked a few looks from your wardrobe as backup plans."
        }
        FailureContext::Notification => {
            "We couldn't deliver your reminder just now. We'll try again soon."
        }
        FailureContext::Unknown => "Something went wrong, but your wardrobe is safe. Please try again.",
    }
}

pub fn recovery_actions(context: FailureContext) -> &'static [&'static str] {
    match context {
        FailureContext::Network => &[
            "Check your internet connection",
            "Try again in a few moments",
            "Browse your saved outfits",
        ],
        FailureContext::Weather => &[
            "Check weather manually for today",
            "Update your location in settings",
        ],
        FailureContext::Ai => &[
            "Try one of the backup looks",
            "Refresh recommendations later",
        ],
        FailureContext::Notification => &[
            "Open the app to see today's outfit",
            "Check notification settings",
        ],
        FailureContext::Unknown => &["Try again", "Restart the app if the problem continues"],
    }
}
