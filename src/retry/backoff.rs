//! Backoff schedule and retry budgets.

use std::time::Duration;

use rand::Rng;

/// Smallest interval the schedule will produce; keeps a wait budget finite.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// How long the engine may keep retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryLimit {
    /// Give up after this many retries (attempts = retries + 1)
    MaxRetries(u32),
    /// Give up once cumulative backoff sleep reaches this budget
    MaxWait(Duration),
}

/// Backoff parameters for one retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Growth factor applied after each wait, at least 1.0
    pub multiplier: f64,
    /// Fraction of the next growth step added at random, 0.0..=1.0
    pub jitter: f64,
    pub limit: RetryLimit,
}

impl RetryPolicy {
    /// Lifecycle polling: is the close/promote done yet.
    pub fn poll_default() -> Self {
        Self {
            initial_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(30),
            multiplier: 1.5,
            jitter: 0.5,
            limit: RetryLimit::MaxWait(Duration::from_secs(60 * 60)),
        }
    }

    /// Single HTTP requests against the staging suite.
    pub fn transport_default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(15),
            multiplier: 1.5,
            jitter: 0.5,
            limit: RetryLimit::MaxRetries(15),
        }
    }

    /// Bundle uploads, where a conflict must not be retried.
    pub fn upload_default() -> Self {
        Self {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.5,
            limit: RetryLimit::MaxRetries(3),
        }
    }

    pub fn with_limit(mut self, limit: RetryLimit) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_intervals(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_interval = initial;
        self.max_interval = max;
        self
    }

    /// Whether another retry is allowed after `retries` retries and `waited` total sleep.
    pub fn is_exhausted(&self, retries: u32, waited: Duration) -> bool {
        match self.limit {
            RetryLimit::MaxRetries(max) => retries >= max,
            RetryLimit::MaxWait(budget) => waited >= budget,
        }
    }

    /// Remaining wait budget, for wait-bounded policies.
    pub fn remaining(&self, waited: Duration) -> Option<Duration> {
        match self.limit {
            RetryLimit::MaxWait(budget) => Some(budget.saturating_sub(waited)),
            RetryLimit::MaxRetries(_) => None,
        }
    }

    pub fn backoff(&self) -> Backoff {
        let max = self.max_interval.max(MIN_INTERVAL);
        Backoff {
            current: self.initial_interval.clamp(MIN_INTERVAL, max),
            max,
            multiplier: if self.multiplier.is_finite() {
                self.multiplier.max(1.0)
            } else {
                1.0
            },
            jitter: if self.jitter.is_finite() {
                self.jitter.clamp(0.0, 1.0)
            } else {
                0.0
            },
        }
    }
}

/// Stateful wait schedule.
///
/// Wait `k` falls in `[b_k, b_k + jitter * (b_{k+1} - b_k)]` where `b_k` is
/// the un-jittered interval, so successive waits never decrease and never
/// exceed `max_interval`.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
    multiplier: f64,
    jitter: f64,
}

impl Backoff {
    pub fn next_wait<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Duration {
        let base = self.current;
        let grown = base.as_secs_f64() * self.multiplier;
        let next = Duration::try_from_secs_f64(grown).map_or(self.max, |d| d.min(self.max));
        let span = next.saturating_sub(base);
        let wait = base + span.mul_f64(self.jitter * rng.random::<f64>());

        self.current = next;
        wait.min(self.max)
    }
}
