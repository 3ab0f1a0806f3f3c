//! Domain values that flow through the fallback paths.
//!
//! These mirror the JSON shapes the app already stores on device, so field
//! names serialize in camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Below this temperature (°F) the weather counts as cold.
pub const COLD_THRESHOLD_F: f64 = 50.0;

/// Above this temperature (°F) the weather counts as hot.
pub const HOT_THRESHOLD_F: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Windy,
    Stormy,
}

impl WeatherCondition {
    /// Rain, snow, or storms.
    pub fn is_wet(self) -> bool {
        matches!(
            self,
            WeatherCondition::Rainy | WeatherCondition::Snowy | WeatherCondition::Stormy
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Snowy => "snowy",
            WeatherCondition::Windy => "windy",
            WeatherCondition::Stormy => "stormy",
        }
    }
}

/// Weather the recommendation engine styles against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherContext {
    /// Degrees Fahrenheit.
    pub temperature: f64,
    pub condition: WeatherCondition,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// Miles per hour.
    pub wind_speed: f64,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    /// True when synthesized rather than observed.
    #[serde(default)]
    pub is_fallback: bool,
}

impl WeatherContext {
    pub fn is_cold(&self) -> bool {
        self.temperature < COLD_THRESHOLD_F
    }

    pub fn is_hot(&self) -> bool {
        self.temperature > HOT_THRESHOLD_F
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Top,
    Bottom,
    Dress,
    Outerwear,
    Shoes,
    Accessory,
}

/// One garment in the user's wardrobe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub id: String,
    pub name: String,
    pub category: ItemCategory,
    /// Finer garment type, e.g. `"tank-top"` or `"parka"`.
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub last_worn: Option<DateTime<Utc>>,
    #[serde(default)]
    pub wear_count: u32,
}

impl WardrobeItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            subcategory: None,
            colors: Vec::new(),
            tags: Vec::new(),
            last_worn: None,
            wear_count: 0,
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn worn_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_worn = Some(at);
        self
    }

    /// Lower-cased subcategory and tags, used for rule matching.
    pub fn descriptors(&self) -> impl Iterator<Item = String> + '_ {
        self.subcategory
            .iter()
            .chain(self.tags.iter())
            .map(|s| s.to_lowercase())
    }
}

/// A suggested outfit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitRecommendation {
    pub id: String,
    pub items: Vec<WardrobeItem>,
    pub confidence_note: String,
    pub reasoning: Vec<String>,
    #[serde(default)]
    pub is_quick_option: bool,
    pub created_at: DateTime<Utc>,
}

/// The set of outfits generated for a user on a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRecommendations {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub recommendations: Vec<OutfitRecommendation>,
    pub generated_at: DateTime<Utc>,
}
