//! Seasonal weather estimate used when neither live nor cached weather exists.

use aynamoda_resilience_core::{WeatherCondition, WeatherContext};
use chrono::{DateTime, Datelike, Utc};

/// Location reported on synthesized weather.
pub const UNKNOWN_LOCATION: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Northern-hemisphere meteorological season for a 1-based month.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    fn band(self) -> (f64, WeatherCondition, u8, f64) {
        // (°F, condition, humidity %, wind mph)
        match self {
            Season::Winter => (40.0, WeatherCondition::Cloudy, 70, 10.0),
            Season::Spring => (62.0, WeatherCondition::Cloudy, 60, 8.0),
            Season::Summer => (78.0, WeatherCondition::Sunny, 50, 6.0),
            Season::Autumn => (55.0, WeatherCondition::Windy, 65, 12.0),
        }
    }
}

/// A plausible weather guess for `now`, flagged as a fallback.
pub fn seasonal_weather(now: DateTime<Utc>) -> WeatherContext {
    let (temperature, condition, humidity, wind_speed) = Season::from_month(now.month()).band();
    WeatherContext {
        temperature,
        condition,
        humidity,
        wind_speed,
        location: UNKNOWN_LOCATION.to_string(),
        timestamp: now,
        is_fallback: true,
    }
}
