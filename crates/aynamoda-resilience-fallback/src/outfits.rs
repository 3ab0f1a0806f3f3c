//! Rule-based outfit picks used when the recommendation service is down.

use aynamoda_resilience_core::{ItemCategory, OutfitRecommendation, WardrobeItem, WeatherContext};
use chrono::{DateTime, Utc};

/// Outfits produced per fallback call unless configured otherwise.
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 3;

// Whole words, hyphen-joined for multi-word terms. A trailing "s" or "es"
// on the last word also matches.
const COLD_EXCLUDED: &[&str] = &[
    "tank", "tanktop", "shorts", "sandal", "flip-flop", "sundress", "crop", "linen", "swim",
    "swimsuit", "swimwear", "bikini",
];
const HOT_EXCLUDED: &[&str] = &[
    "coat", "overcoat", "parka", "puffer", "sweater", "wool", "woolen", "woollen", "fleece",
    "boot", "turtleneck", "scarf", "scarves",
];
const WET_EXCLUDED: &[&str] = &["suede", "canvas", "silk", "sandal", "espadrille"];

/// Outfits plus whether the weather filter had to be abandoned.
#[derive(Debug, Clone, PartialEq)]
pub struct OutfitPlan {
    pub outfits: Vec<OutfitRecommendation>,
    /// `true` when no item passed the weather filter and picks were made by
    /// recency of wear instead.
    pub emergency: bool,
}

/// `true` unless the item matches an exclusion for the current weather.
pub fn is_weather_appropriate(item: &WardrobeItem, weather: &WeatherContext) -> bool {
    let mut excluded: Vec<&str> = Vec::new();
    if weather.is_cold() {
        excluded.extend_from_slice(COLD_EXCLUDED);
    }
    if weather.is_hot() {
        excluded.extend_from_slice(HOT_EXCLUDED);
    }
    if weather.condition.is_wet() {
        excluded.extend_from_slice(WET_EXCLUDED);
    }
    if excluded.is_empty() {
        return true;
    }

    let name = item.name.to_lowercase();
    !std::iter::once(name).chain(item.descriptors()).any(|text| {
        let tokens = words(&text);
        excluded.iter().any(|term| mentions(&tokens, term))
    })
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

/// `true` if `term`'s words appear consecutively in `words`.
fn mentions(words: &[&str], term: &str) -> bool {
    let parts: Vec<&str> = term.split('-').collect();
    let Some((last, leading)) = parts.split_last() else {
        return false;
    };
    words.windows(parts.len()).any(|window| {
        window[..leading.len()] == *leading && same_word(window[leading.len()], last)
    })
}

fn same_word(word: &str, term: &str) -> bool {
    word.strip_prefix(term)
        .is_some_and(|rest| rest.is_empty() || rest == "s" || rest == "es")
}

/// Most recently worn first; never-worn items last, in their original order.
pub fn emergency_order(items: &[WardrobeItem]) -> Vec<&WardrobeItem> {
    let mut ordered: Vec<&WardrobeItem> = items.iter().collect();
    ordered.sort_by(|a, b| b.last_worn.cmp(&a.last_worn));
    ordered
}

/// Picks up to `max` outfits from `items` for `weather`.
pub fn plan_outfits(
    items: &[WardrobeItem],
    weather: &WeatherContext,
    max: usize,
    now: DateTime<Utc>,
) -> OutfitPlan {
    let suitable: Vec<&WardrobeItem> = items
        .iter()
        .filter(|item| is_weather_appropriate(item, weather))
        .collect();

    let emergency = suitable.is_empty();
    let pool = if emergency {
        emergency_order(items)
    } else {
        suitable
    };

    let outfits = assemble(&pool, weather, max)
        .into_iter()
        .map(|pieces| recommendation(pieces, weather, emergency, now))
        .collect();

    OutfitPlan { outfits, emergency }
}

fn assemble<'a>(
    pool: &[&'a WardrobeItem],
    weather: &WeatherContext,
    max: usize,
) -> Vec<Vec<&'a WardrobeItem>> {
    let of = |category: ItemCategory| -> Vec<&'a WardrobeItem> {
        pool.iter()
            .copied()
            .filter(|item| item.category == category)
            .collect()
    };
    let tops = of(ItemCategory::Top);
    let bottoms = of(ItemCategory::Bottom);
    let shoes = of(ItemCategory::Shoes);
    let outerwear = of(ItemCategory::Outerwear);

    let mut cores: Vec<Vec<&WardrobeItem>> = Vec::new();
    if !tops.is_empty() && !bottoms.is_empty() {
        for i in 0..tops.len().max(bottoms.len()) {
            cores.push(vec![tops[i % tops.len()], bottoms[i % bottoms.len()]]);
        }
    }
    cores.extend(of(ItemCategory::Dress).into_iter().map(|dress| vec![dress]));
    if cores.is_empty() {
        // Nothing forms a base outfit; offer pieces individually.
        cores = pool.iter().map(|item| vec![*item]).collect();
    }
    cores.truncate(max);

    let layered = weather.is_cold() || weather.condition.is_wet();
    for (i, outfit) in cores.iter_mut().enumerate() {
        if !shoes.is_empty() {
            push_unique(outfit, shoes[i % shoes.len()]);
        }
        if layered && !outerwear.is_empty() {
            push_unique(outfit, outerwear[i % outerwear.len()]);
        }
    }
    cores
}

fn push_unique<'a>(outfit: &mut Vec<&'a WardrobeItem>, item: &'a WardrobeItem) {
    if outfit.iter().all(|existing| existing.id != item.id) {
        outfit.push(item);
    }
}

fn recommendation(
    pieces: Vec<&WardrobeItem>,
    weather: &WeatherContext,
    emergency: bool,
    now: DateTime<Utc>,
) -> OutfitRecommendation {
    let (confidence_note, reasoning) = if emergency {
        (
            "A quick pick from pieces you reach for often. Full styling returns once we reconnect.",
            vec![
                "Weather appropriate options were limited, so these favor what you wore most recently"
                    .to_string(),
                format!(
                    "Consider layering for {:.0}°F and {} conditions",
                    weather.temperature,
                    weather.condition.as_str()
                ),
            ],
        )
    } else {
        (
            "A dependable look for today's weather. Full styling returns once we reconnect.",
            vec![
                format!(
                    "Weather appropriate for {:.0}°F and {} conditions",
                    weather.temperature,
                    weather.condition.as_str()
                ),
                "Put together from your own wardrobe".to_string(),
            ],
        )
    };

    OutfitRecommendation {
        id: uuid::Uuid::new_v4().to_string(),
        items: pieces.into_iter().cloned().collect(),
        confidence_note: confidence_note.to_string(),
        reasoning,
        is_quick_option: true,
        created_at: now,
    }
}
