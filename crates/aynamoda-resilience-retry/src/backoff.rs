use std::time::Duration;

/// Computes the delay before a retry.
///
/// Implementations must be monotonically non-decreasing in `attempt` for the
/// exponential strategies; [`FixedInterval`] is flat.
pub trait IntervalFunction: Send + Sync {
    /// Delay before retry number `attempt` (0-indexed: the first retry is 0).
    fn next_interval(&self, attempt: usize) -> Duration;
}

/// Same delay before every retry.
#[derive(Debug, Clone)]
pub struct FixedInterval {
    duration: Duration,
}

impl FixedInterval {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl IntervalFunction for FixedInterval {
    fn next_interval(&self, _attempt: usize) -> Duration {
        self.duration
    }
}

/// `base_delay * multiplier^attempt`, optionally capped.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_delay: Duration,
    multiplier: f64,
    max_interval: Option<Duration>,
}

impl ExponentialBackoff {
    /// Doubling backoff starting at `base_delay`.
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            multiplier: 2.0,
            max_interval: None,
        }
    }

    /// Sets the growth factor. Values below 1.0 are clamped to 1.0.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Caps every interval at `max_interval`.
    pub fn max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = Some(max_interval);
        self
    }

    fn raw(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = self.multiplier.powi(exponent).min(1e9);
        // Rounded to whole nanoseconds; `as` saturates on overflow.
        let interval = Duration::from_nanos((self.base_delay.as_nanos() as f64 * factor).round() as u64);
        match self.max_interval {
            Some(max) => interval.min(max),
            None => interval,
        }
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        self.raw(attempt)
    }
}

/// Exponential backoff with up-to-`jitter` random extra delay.
///
/// The jitter is only ever added, so the sequence stays increasing whenever
/// `jitter` is smaller than the base delay.
#[derive(Debug, Clone)]
pub struct JitteredBackoff {
    inner: ExponentialBackoff,
    jitter: Duration,
}

impl JitteredBackoff {
    pub fn new(base_delay: Duration, jitter: Duration) -> Self {
        Self {
            inner: ExponentialBackoff::new(base_delay),
            jitter,
        }
    }
}

impl IntervalFunction for JitteredBackoff {
    fn next_interval(&self, attempt: usize) -> Duration {
        use rand::Rng;
        let base = self.inner.raw(attempt);
        let max_jitter = self.jitter.as_millis() as u64;
        if max_jitter == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=max_jitter))
    }
}

/// Closure-backed interval.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn next_interval(&self, attempt: usize) -> Duration {
        (self.f)(attempt)
    }
}
