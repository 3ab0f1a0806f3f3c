//! Recommendations, weather, and wardrobe helpers.

use super::morning_clock;
use aynamoda_resilience_cache::{CacheTtls, FallbackCache};
use aynamoda_resilience_core::{
    Clock, DailyRecommendations, ItemCategory, MemoryStore, OutfitRecommendation, WardrobeItem,
    WeatherCondition, WeatherContext,
};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

fn daily(clock: &dyn Clock) -> DailyRecommendations {
    let tee = WardrobeItem::new("i1", "White tee", ItemCategory::Top);
    let jeans = WardrobeItem::new("i2", "Straight jeans", ItemCategory::Bottom);
    DailyRecommendations {
        id: "rec-2024-05-20".into(),
        user_id: "u1".into(),
        date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        recommendations: vec![OutfitRecommendation {
            id: "o1".into(),
            items: vec![tee, jeans],
            confidence_note: "Easy and bright".into(),
            reasoning: vec!["Mild spring morning".into()],
            is_quick_option: false,
            created_at: clock.now(),
        }],
        generated_at: clock.now(),
    }
}

fn sunny(clock: &dyn Clock) -> WeatherContext {
    WeatherContext {
        temperature: 71.0,
        condition: WeatherCondition::Sunny,
        humidity: 40,
        wind_speed: 3.5,
        location: "Izmir".into(),
        timestamp: clock.now(),
        is_fallback: false,
    }
}

#[tokio::test]
async fn cached_recommendations_round_trip_by_id() {
    let clock = morning_clock();
    let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
        .clock(clock.clone())
        .build();
    let rec = daily(&*clock);

    cache.cache_recommendations("u1", &rec, None).await.unwrap();
    let cached = cache.get_cached_recommendations("u1", None).await.unwrap();

    assert_eq!(cached.id, rec.id);
    assert_eq!(cached, rec);
}

#[tokio::test]
async fn dated_recommendations_use_their_own_key() {
    let clock = morning_clock();
    let store = Arc::new(MemoryStore::new());
    let cache = FallbackCache::builder(store.clone())
        .clock(clock.clone())
        .build();
    let date = NaiveDate::from_ymd_opt(2024, 5, 21).unwrap();

    cache
        .cache_recommendations("u1", &daily(&*clock), Some(date))
        .await
        .unwrap();

    assert!(store.contains_key("recommendations_u1_2024-05-21"));
    assert!(cache.get_cached_recommendations("u1", None).await.is_none());
    assert!(cache.get_cached_recommendations("u1", Some(date)).await.is_some());
}

#[tokio::test]
async fn recommendations_expire_after_a_day() {
    let clock = morning_clock();
    let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
        .clock(clock.clone())
        .build();

    cache
        .cache_recommendations("u1", &daily(&*clock), None)
        .await
        .unwrap();
    clock.advance(chrono::Duration::hours(23));
    assert!(cache.get_cached_recommendations("u1", None).await.is_some());
    clock.advance(chrono::Duration::hours(2));
    assert!(cache.get_cached_recommendations("u1", None).await.is_none());
}

#[tokio::test]
async fn weather_expires_after_an_hour_by_default() {
    let clock = morning_clock();
    let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
        .clock(clock.clone())
        .build();

    cache.cache_weather("u1", &sunny(&*clock)).await.unwrap();
    clock.advance(chrono::Duration::minutes(59));
    assert_eq!(
        cache.get_cached_weather("u1").await.map(|w| w.location),
        Some("Izmir".to_string())
    );
    clock.advance(chrono::Duration::minutes(2));
    assert!(cache.get_cached_weather("u1").await.is_none());
}

#[tokio::test]
async fn custom_ttls_apply_per_domain() {
    let clock = morning_clock();
    let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
        .clock(clock.clone())
        .ttls(CacheTtls {
            weather: Duration::from_secs(10 * 60),
            ..CacheTtls::default()
        })
        .wardrobe_ttl(Duration::from_secs(60))
        .build();

    let items = vec![
        WardrobeItem::new("c1", "Trench coat", ItemCategory::Outerwear),
        WardrobeItem::new("s1", "Loafers", ItemCategory::Shoes),
    ];
    cache.cache_wardrobe("u1", &items).await.unwrap();
    cache.cache_weather("u1", &sunny(&*clock)).await.unwrap();

    clock.advance(chrono::Duration::minutes(2));
    assert!(cache.get_cached_wardrobe("u1").await.is_none());
    assert!(cache.get_cached_weather("u1").await.is_some());

    clock.advance(chrono::Duration::minutes(9));
    assert!(cache.get_cached_weather("u1").await.is_none());
}

#[tokio::test]
async fn users_do_not_see_each_others_entries() {
    let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
        .clock(morning_clock())
        .build();
    let items = vec![WardrobeItem::new("d1", "Wrap dress", ItemCategory::Dress)];

    cache.cache_wardrobe("alice", &items).await.unwrap();

    assert_eq!(cache.get_cached_wardrobe("alice").await, Some(items));
    assert_eq!(cache.get_cached_wardrobe("bob").await, None);
}
