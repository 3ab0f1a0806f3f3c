//! Bounded retry for the AYNAMODA resilience layer.
//!
//! [`RetryExecutor`] wraps a zero-argument async operation, invokes it, and on
//! failure retries up to `max_retries` more times with exponentially growing
//! delays. Every failed attempt is appended to the persisted
//! [`ErrorLog`](aynamoda_resilience_core::ErrorLog). When retries run out the
//! original error is handed back: picking a fallback is the caller's job.
//!
//! # Examples
//!
//! ```
//! use aynamoda_resilience_core::OperationContext;
//! use aynamoda_resilience_retry::{RetryExecutor, RetryOptions};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), String> {
//! let executor = RetryExecutor::builder().name("weather").build();
//! let ctx = OperationContext::new("weather", "getCurrentWeather");
//! let options = RetryOptions::new(2, Duration::from_millis(10));
//!
//! let forecast = executor
//!     .execute_with_retry(|| async { Ok::<_, String>("sunny") }, &ctx, &options)
//!     .await?;
//! assert_eq!(forecast, "sunny");
//! # Ok(())
//! # }
//! ```
//!
//! # Cancellation
//!
//! [`RetryExecutor::execute_with_cancellation`] takes a
//! [`CancellationToken`]. Cancelling it while an attempt is in flight or
//! during a backoff sleep stops the sequence with [`RetryError::Cancelled`],
//! so an abandoned screen does not keep retrying in the background.

mod backoff;
mod config;
mod error;
mod events;
mod layer;

pub use backoff::{ExponentialBackoff, FixedInterval, FnInterval, IntervalFunction, JitteredBackoff};
pub use config::{RetryExecutorBuilder, RetryOptions, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
pub use error::RetryError;
pub use events::RetryEvent;
pub use layer::{Retry, RetryLayer};
pub use tokio_util::sync::CancellationToken;

use aynamoda_resilience_core::OperationContext;
use config::RetryConfig;
use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "metrics")]
use std::sync::Once;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// Runs async operations with bounded retry and exponential backoff.
///
/// Cheap to clone; clones share configuration, log, and listeners.
#[derive(Clone)]
pub struct RetryExecutor {
    config: Arc<RetryConfig>,
}

impl RetryExecutor {
    /// Creates a new configuration builder.
    pub fn builder() -> RetryExecutorBuilder {
        RetryExecutorBuilder::new()
    }

    pub(crate) fn from_config(config: RetryConfig) -> Self {
        #[cfg(feature = "metrics")]
        METRICS_INIT.call_once(|| {
            describe_counter!("retry_calls_total", "Total number of retried operations by outcome");
            describe_counter!("retry_attempts_total", "Total number of retry attempts");
        });

        Self {
            config: Arc::new(config),
        }
    }

    /// Options used by [`execute`](Self::execute).
    pub fn defaults(&self) -> &RetryOptions {
        &self.config.defaults
    }

    /// Name reported in events and logs.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Retries `operation` using the executor's default options.
    pub async fn execute<T, E, F, Fut>(&self, operation: F, context: &OperationContext) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let options = self.config.defaults.clone();
        self.execute_with_retry(operation, context, &options).await
    }

    /// Invokes `operation`, retrying failures up to `options.max_retries` times.
    ///
    /// On permanent failure `operation` runs exactly `1 + max_retries` times
    /// and the last error is returned unchanged.
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        operation: F,
        context: &OperationContext,
        options: &RetryOptions,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.execute_if(operation, context, options, |_: &E| true).await
    }

    /// Like [`execute_with_retry`](Self::execute_with_retry), but only errors
    /// for which `should_retry` returns `true` are retried.
    pub async fn execute_if<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        context: &OperationContext,
        options: &RetryOptions,
        should_retry: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    self.succeeded(context, attempt + 1);
                    return Ok(value);
                }
                Err(error) => {
                    match self.failed(context, options, attempt, error, &should_retry).await {
                        ControlFlow::Break(error) => return Err(error),
                        ControlFlow::Continue(delay) => tokio::time::sleep(delay).await,
                    }
                }
            }
            attempt += 1;
        }
    }

    /// Retries like [`execute_with_retry`](Self::execute_with_retry) until
    /// `token` is cancelled.
    ///
    /// Cancellation drops the in-flight attempt or interrupts the backoff
    /// sleep; no further attempts are made.
    pub async fn execute_with_cancellation<T, E, F, Fut>(
        &self,
        mut operation: F,
        context: &OperationContext,
        options: &RetryOptions,
        token: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let should_retry = |_: &E| true;
        let mut attempt = 0;
        loop {
            if token.is_cancelled() {
                return Err(self.cancelled(context, attempt));
            }
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(self.cancelled(context, attempt + 1)),
                result = operation() => result,
            };

            match result {
                Ok(value) => {
                    self.succeeded(context, attempt + 1);
                    return Ok(value);
                }
                Err(error) => {
                    match self.failed(context, options, attempt, error, &should_retry).await {
                        ControlFlow::Break(error) => return Err(RetryError::Operation(error)),
                        ControlFlow::Continue(delay) => {
                            tokio::select! {
                                biased;
                                _ = token.cancelled() => {
                                    return Err(self.cancelled(context, attempt + 1));
                                }
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }
                    }
                }
            }
            attempt += 1;
        }
    }

    fn interval(&self, options: &RetryOptions, attempt: usize) -> Duration {
        match &self.config.interval_fn {
            Some(interval) => interval.next_interval(attempt),
            None => ExponentialBackoff::new(options.base_delay).next_interval(attempt),
        }
    }

    fn succeeded(&self, context: &OperationContext, attempts: usize) {
        tracing::debug!(
            retry = %self.config.name,
            service = %context.service,
            operation = %context.operation,
            attempts,
            "operation succeeded"
        );

        #[cfg(feature = "metrics")]
        counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "success")
            .increment(1);

        self.config.event_listeners.emit(&RetryEvent::Success {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            context: context.clone(),
            attempts,
        });
    }

    /// Logs a failed attempt and decides whether to go again.
    async fn failed<E, P>(
        &self,
        context: &OperationContext,
        options: &RetryOptions,
        attempt: usize,
        error: E,
        should_retry: &P,
    ) -> ControlFlow<E, Duration>
    where
        E: fmt::Display,
        P: Fn(&E) -> bool,
    {
        if let Some(log) = &self.config.error_log {
            if let Err(log_error) = log.record(context, error.to_string()).await {
                tracing::debug!(error = %log_error, "could not persist error log entry");
            }
        }

        let attempts = attempt + 1;

        if !should_retry(&error) {
            #[cfg(feature = "metrics")]
            counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "ignored")
                .increment(1);

            self.config.event_listeners.emit(&RetryEvent::Ignored {
                source: self.config.name.clone(),
                timestamp: self.config.clock.now(),
                context: context.clone(),
                attempts,
            });
            return ControlFlow::Break(error);
        }

        if attempt >= options.max_retries {
            tracing::warn!(
                retry = %self.config.name,
                service = %context.service,
                operation = %context.operation,
                attempts,
                error = %error,
                "retries exhausted"
            );

            #[cfg(feature = "metrics")]
            counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "exhausted")
                .increment(1);

            self.config.event_listeners.emit(&RetryEvent::Exhausted {
                source: self.config.name.clone(),
                timestamp: self.config.clock.now(),
                context: context.clone(),
                attempts,
            });
            return ControlFlow::Break(error);
        }

        let delay = self.interval(options, attempt);
        tracing::debug!(
            retry = %self.config.name,
            service = %context.service,
            operation = %context.operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "retrying after failure"
        );

        #[cfg(feature = "metrics")]
        counter!("retry_attempts_total", "retry" => self.config.name.clone()).increment(1);

        self.config.event_listeners.emit(&RetryEvent::Retry {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            context: context.clone(),
            attempt,
            delay,
        });
        ControlFlow::Continue(delay)
    }

    fn cancelled<E>(&self, context: &OperationContext, attempts: usize) -> RetryError<E> {
        tracing::debug!(
            retry = %self.config.name,
            service = %context.service,
            operation = %context.operation,
            attempts,
            "retry sequence cancelled"
        );

        #[cfg(feature = "metrics")]
        counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "cancelled")
            .increment(1);

        self.config.event_listeners.emit(&RetryEvent::Cancelled {
            source: self.config.name.clone(),
            timestamp: self.config.clock.now(),
            context: context.clone(),
            attempts,
        });
        RetryError::Cancelled { attempts }
    }
}

impl fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("name", &self.config.name)
            .field("defaults", &self.config.defaults)
            .finish_non_exhaustive()
    }
}
