//! Bounded retry with jittered backoff.
//!
//! The engine knows nothing about staging: callers supply the operation, how
//! to classify its values and errors, the backoff policy, and optionally an
//! observer notified before each retry. The lifecycle driver uses it to poll
//! the activity log; the HTTP client uses a separate instance per request.

mod backoff;
mod sleeper;


use std::time::Duration;

use thiserror::Error;

pub use backoff::{Backoff, RetryLimit, RetryPolicy};
pub use sleeper::{Sleeper, ThreadSleeper};

/// Classification of a value returned by the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E> {
    Succeeded,
    Retryable(E),
    NonRetryable(E),
}

/// Classification of an error raised by the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass<E> {
    Retryable(E),
    NonRetryable(E),
}

#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// Classified as non-retryable; no further attempts were made
    #[error("{0}")]
    Aborted(E),

    /// The retry budget ran out while the operation kept failing
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        waited: Duration,
        last: E,
    },
}

impl<E> RetryError<E> {
    /// The error that ended the loop.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Aborted(e) => e,
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// State handed to a [`RetryObserver`] before each retry.
#[derive(Debug)]
pub struct RetryContext<'a, E> {
    /// Attempts made so far
    pub attempt: u32,
    /// Total backoff slept so far
    pub waited: Duration,
    /// Remaining wait budget for wait-bounded policies
    pub remaining: Option<Duration>,
    /// Sleep about to happen
    pub next_wait: Duration,
    pub last_error: &'a E,
}

/// Hook for progress reporting between attempts.
pub trait RetryObserver<E> {
    fn before_retry(&self, ctx: &RetryContext<'_, E>);
}

impl<E, F> RetryObserver<E> for F
where
    F: Fn(&RetryContext<'_, E>),
{
    fn before_retry(&self, ctx: &RetryContext<'_, E>) {
        self(ctx)
    }
}

static THREAD_SLEEPER: ThreadSleeper = ThreadSleeper;

type ValueClassifier<'a, T, E> = Box<dyn Fn(&T) -> Outcome<E> + 'a>;
type ErrorClassifier<'a, E> = Box<dyn Fn(E) -> ErrorClass<E> + 'a>;

/// Retry executor configured with a builder.
///
/// By default every value succeeds and every error is retryable.
pub struct Retry<'a, T, E> {
    policy: RetryPolicy,
    classify_value: ValueClassifier<'a, T, E>,
    classify_error: ErrorClassifier<'a, E>,
    observer: Option<&'a dyn RetryObserver<E>>,
    sleeper: &'a dyn Sleeper,
}

impl<'a, T: 'a, E: 'a> Retry<'a, T, E> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            classify_value: Box::new(|_: &T| Outcome::Succeeded),
            classify_error: Box::new(ErrorClass::Retryable),
            observer: None,
            sleeper: &THREAD_SLEEPER,
        }
    }

    pub fn classify_value(mut self, classifier: impl Fn(&T) -> Outcome<E> + 'a) -> Self {
        self.classify_value = Box::new(classifier);
        self
    }

    pub fn classify_error(mut self, classifier: impl Fn(E) -> ErrorClass<E> + 'a) -> Self {
        self.classify_error = Box::new(classifier);
        self
    }

    pub fn observer(mut self, observer: &'a dyn RetryObserver<E>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn sleeper(mut self, sleeper: &'a dyn Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run `operation` until it succeeds, fails permanently, or the budget runs out.
    pub fn run(&self, mut operation: impl FnMut() -> Result<T, E>) -> Result<T, RetryError<E>> {
        let mut rng = rand::rng();
        let mut backoff = self.policy.backoff();
        let mut attempts: u32 = 0;
        let mut waited = Duration::ZERO;

        loop {
            attempts += 1;

            let error = match operation() {
                Ok(value) => match (self.classify_value)(&value) {
                    Outcome::Succeeded => return Ok(value),
                    Outcome::NonRetryable(e) => return Err(RetryError::Aborted(e)),
                    Outcome::Retryable(e) => e,
                },
                Err(e) => match (self.classify_error)(e) {
                    ErrorClass::NonRetryable(e) => return Err(RetryError::Aborted(e)),
                    ErrorClass::Retryable(e) => e,
                },
            };

            if self.policy.is_exhausted(attempts - 1, waited) {
                return Err(RetryError::Exhausted {
                    attempts,
                    waited,
                    last: error,
                });
            }

            let next_wait = backoff.next_wait(&mut rng);
            if let Some(observer) = self.observer {
                observer.before_retry(&RetryContext {
                    attempt: attempts,
                    waited,
                    remaining: self.policy.remaining(waited),
                    next_wait,
                    last_error: &error,
                });
            }

            self.sleeper.sleep(next_wait);
            waited += next_wait;
        }
    }
}
