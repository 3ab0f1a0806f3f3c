use crate::backoff::{FixedInterval, IntervalFunction};
use crate::events::RetryEvent;
use crate::RetryExecutor;
use aynamoda_resilience_core::events::{EventListeners, FnListener};
use aynamoda_resilience_core::{Clock, ErrorLog, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Per-call retry settings.
///
/// Serialized with millisecond delays and camelCase names so the same JSON the
/// app ships as remote config can be fed in directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryOptions {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: usize,
    /// Delay before the first retry; later retries grow exponentially.
    #[serde(with = "millis")]
    pub base_delay: Duration,
    /// Whether a cached substitute may be served once retries run out.
    pub enable_offline_mode: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            enable_offline_mode: true,
        }
    }
}

impl RetryOptions {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Sets `enable_offline_mode`.
    pub fn offline_mode(mut self, enabled: bool) -> Self {
        self.enable_offline_mode = enabled;
        self
    }

    /// Total invocations on permanent failure.
    pub fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Shared executor state.
pub(crate) struct RetryConfig {
    pub(crate) defaults: RetryOptions,
    pub(crate) interval_fn: Option<Arc<dyn IntervalFunction>>,
    pub(crate) error_log: Option<ErrorLog>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

/// Builder for [`RetryExecutor`].
pub struct RetryExecutorBuilder {
    defaults: RetryOptions,
    interval_fn: Option<Arc<dyn IntervalFunction>>,
    error_log: Option<ErrorLog>,
    clock: Arc<dyn Clock>,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl Default for RetryExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryExecutorBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_retries: 3
    /// - base_delay: 1s, doubling per retry
    /// - no error log
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            defaults: RetryOptions::default(),
            interval_fn: None,
            error_log: None,
            clock: Arc::new(SystemClock),
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Options used by [`RetryExecutor::execute`].
    pub fn defaults(mut self, options: RetryOptions) -> Self {
        self.defaults = options;
        self
    }

    /// Sets the default retry count.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.defaults.max_retries = max_retries;
        self
    }

    /// Sets the default base delay.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.defaults.base_delay = base_delay;
        self
    }

    /// Uses the same delay before every retry instead of exponential growth.
    pub fn fixed_backoff(mut self, duration: Duration) -> Self {
        self.interval_fn = Some(Arc::new(FixedInterval::new(duration)));
        self
    }

    /// Replaces the per-call exponential backoff.
    ///
    /// A custom interval ignores `RetryOptions::base_delay`.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval_fn = Some(Arc::new(interval_fn));
        self
    }

    /// Appends one entry per failed attempt to `log`.
    pub fn error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = Some(log);
        self
    }

    /// Clock used for event timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the name reported in events and logs.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked before each retry delay.
    ///
    /// Called with the 0-indexed retry number and the delay about to elapse.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked on success with the total attempt count.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when every attempt failed.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when a sequence is cancelled.
    pub fn on_cancelled<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Cancelled { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a listener for every retry event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&RetryEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(f));
        self
    }

    /// Builds the executor.
    pub fn build(self) -> RetryExecutor {
        RetryExecutor::from_config(RetryConfig {
            defaults: self.defaults,
            interval_fn: self.interval_fn,
            error_log: self.error_log,
            clock: self.clock,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}
