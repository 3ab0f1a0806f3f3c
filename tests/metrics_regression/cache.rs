//! Fallback cache metrics regression tests

use super::helpers::*;
use aynamoda_resilience_cache::FallbackCache;
use aynamoda_resilience_core::MemoryStore;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn cache_lookup_metrics_exist() {
    init_recorder();

    let cache = FallbackCache::builder(Arc::new(MemoryStore::new()))
        .name("test_cache")
        .build();

    cache.cache("k", &1u32, None).await.unwrap();
    let _ = cache.get_cached::<u32>("k").await;
    let _ = cache.get_cached::<u32>("absent").await;

    assert_counter_exists("fallback_cache_writes_total");
    assert_metric_has_label("fallback_cache_writes_total", "cache", "test_cache");
    assert_metric_has_label("fallback_cache_writes_total", "result", "stored");

    assert_counter_exists("fallback_cache_lookups_total");
    assert_metric_has_label("fallback_cache_lookups_total", "cache", "test_cache");
    assert_metric_has_label("fallback_cache_lookups_total", "result", "hit");
    assert_metric_has_label("fallback_cache_lookups_total", "result", "miss");
}
