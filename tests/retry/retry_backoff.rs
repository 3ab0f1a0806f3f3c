//! Delay schedules between attempts.

use aynamoda_resilience_core::OperationContext;
use aynamoda_resilience_retry::{ExponentialBackoff, FnInterval, RetryExecutor, RetryOptions};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

fn recorder() -> (Arc<Mutex<Vec<Duration>>>, impl Fn(usize, Duration) + Send + Sync + 'static) {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delays);
    (delays, move |_attempt: usize, delay: Duration| sink.lock().unwrap().push(delay))
}

async fn always_fail() -> Result<(), String> {
    Err("timeout".to_string())
}

fn ctx() -> OperationContext {
    OperationContext::new("weather", "getCurrentWeather")
}

#[tokio::test(start_paused = true)]
async fn default_backoff_doubles_from_base_delay() {
    let (delays, on_retry) = recorder();
    let executor = RetryExecutor::builder().on_retry(on_retry).build();

    let start = Instant::now();
    let _ = executor
        .execute_with_retry(always_fail, &ctx(), &RetryOptions::new(3, Duration::from_millis(100)))
        .await;

    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400)
        ]
    );
    assert!(start.elapsed() >= Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn per_call_base_delay_overrides_defaults() {
    let (delays, on_retry) = recorder();
    let executor = RetryExecutor::builder()
        .base_delay(Duration::from_secs(5))
        .on_retry(on_retry)
        .build();

    let _ = executor
        .execute_with_retry(always_fail, &ctx(), &RetryOptions::new(2, Duration::from_millis(10)))
        .await;

    assert_eq!(
        *delays.lock().unwrap(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
}

#[tokio::test(start_paused = true)]
async fn fixed_backoff_is_flat() {
    let (delays, on_retry) = recorder();
    let executor = RetryExecutor::builder()
        .fixed_backoff(Duration::from_millis(50))
        .on_retry(on_retry)
        .build();

    let _ = executor
        .execute_with_retry(always_fail, &ctx(), &RetryOptions::new(3, Duration::from_millis(1)))
        .await;

    assert_eq!(*delays.lock().unwrap(), vec![Duration::from_millis(50); 3]);
}

#[tokio::test(start_paused = true)]
async fn capped_exponential_backoff() {
    let (delays, on_retry) = recorder();
    let executor = RetryExecutor::builder()
        .backoff(
            ExponentialBackoff::new(Duration::from_millis(100))
                .multiplier(3.0)
                .max_interval(Duration::from_millis(500)),
        )
        .on_retry(on_retry)
        .build();

    let _ = executor
        .execute_with_retry(always_fail, &ctx(), &RetryOptions::new(4, Duration::ZERO))
        .await;

    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(300),
            Duration::from_millis(500),
            Duration::from_millis(500)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn custom_interval_function() {
    let (delays, on_retry) = recorder();
    let executor = RetryExecutor::builder()
        .backoff(FnInterval::new(|attempt| Duration::from_millis(7 * (attempt as u64 + 1))))
        .on_retry(on_retry)
        .build();

    let _ = executor
        .execute_with_retry(always_fail, &ctx(), &RetryOptions::new(2, Duration::ZERO))
        .await;

    assert_eq!(
        *delays.lock().unwrap(),
        vec![Duration::from_millis(7), Duration::from_millis(14)]
    );
}

#[tokio::test(start_paused = true)]
async fn no_delay_after_the_last_attempt() {
    let executor = RetryExecutor::builder().build();

    let start = Instant::now();
    let _ = executor
        .execute_with_retry(always_fail, &ctx(), &RetryOptions::new(1, Duration::from_secs(1)))
        .await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(2));
}
