//! Events emitted by the service error handlers.

use aynamoda_resilience_core::events::ResilienceEvent;
use aynamoda_resilience_core::ErrorLogEntry;
use aynamoda_resilience_sync::PendingCategory;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum FallbackEvent {
    /// Substitute weather was served.
    WeatherSubstituted {
        source: String,
        timestamp: DateTime<Utc>,
        user_id: String,
        /// `false` means the seasonal estimate was used.
        from_cache: bool,
    },
    /// Rule-based outfits were served in place of the stylist's.
    OutfitsSubstituted {
        source: String,
        timestamp: DateTime<Utc>,
        user_id: String,
        count: usize,
        emergency: bool,
    },
    /// A failed action was queued for the next sync pass.
    Queued {
        source: String,
        timestamp: DateTime<Utc>,
        user_id: String,
        category: PendingCategory,
    },
    /// A notification went out through the in-app channel instead.
    DeliveredInApp {
        source: String,
        timestamp: DateTime<Utc>,
        user_id: String,
    },
    /// Every channel failed; someone has to look at this.
    Critical {
        source: String,
        timestamp: DateTime<Utc>,
        entry: ErrorLogEntry,
    },
}

impl ResilienceEvent for FallbackEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::WeatherSubstituted { .. } => "weather_substituted",
            Self::OutfitsSubstituted { .. } => "outfits_substituted",
            Self::Queued { .. } => "queued",
            Self::DeliveredInApp { .. } => "delivered_in_app",
            Self::Critical { .. } => "critical",
        }
    }

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::WeatherSubstituted { timestamp, .. }
            | Self::OutfitsSubstituted { timestamp, .. }
            | Self::Queued { timestamp, .. }
            | Self::DeliveredInApp { timestamp, .. }
            | Self::Critical { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            Self::WeatherSubstituted { source, .. }
            | Self::OutfitsSubstituted { source, .. }
            | Self::Queued { source, .. }
            | Self::DeliveredInApp { source, .. }
            | Self::Critical { source, .. } => source,
        }
    }
}
