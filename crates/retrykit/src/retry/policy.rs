//! Retry policy: the immutable configuration read by the execution loop.

use super::condition::RetryCondition;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Hook invoked before every retry (never before the first attempt).
pub type BeforeRetryHook = Arc<dyn Fn() + Send + Sync>;

/// Hook invoked with the outcome of every retry (never the first attempt).
pub type AfterRetryHook<R, E> = Arc<dyn Fn(&Result<R, E>) + Send + Sync>;

/// Hook invoked once with the final error when a run ends in failure.
pub type FailureHook<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Produces the substitute value returned when failures are suppressed.
pub type Fallback<R> = Arc<dyn Fn() -> R + Send + Sync>;

/// A shared, type-erased retry condition.
pub type SharedCondition<R, E> = Arc<dyn RetryCondition<R, E>>;

/// Everything the executor needs to know to run an operation.
///
/// A policy is assembled through [`RetryBuilder`](super::RetryBuilder) and is
/// read-only while an operation runs. It can be cloned cheaply and executed
/// any number of times; attempt counters live in each run, never here.
///
/// # Defaults
///
/// - no conditions (the first outcome is final)
/// - `max_retries`: 0
/// - `delay`: zero
/// - no hooks, failures propagate
pub struct RetryPolicy<R, E> {
    pub(crate) conditions: Vec<SharedCondition<R, E>>,
    pub(crate) max_retries: u32,
    pub(crate) delay: Duration,
    pub(crate) before_retry: Option<BeforeRetryHook>,
    pub(crate) after_retry: Option<AfterRetryHook<R, E>>,
    pub(crate) on_failure: Option<FailureHook<E>>,
    pub(crate) fallback: Option<Fallback<R>>,
}

impl<R, E> RetryPolicy<R, E> {
    /// Create an empty policy: one attempt, no hooks, failures propagate.
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            max_retries: 0,
            delay: Duration::ZERO,
            before_retry: None,
            after_retry: None,
            on_failure: None,
            fallback: None,
        }
    }

    /// Number of retries allowed after the first attempt.
    ///
    /// An operation runs at most `max_retries() + 1` times.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fixed pause between a retry decision and the next attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of registered retry conditions.
    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// Whether terminal failures are replaced by a substitute value.
    pub fn suppresses_failure(&self) -> bool {
        self.fallback.is_some()
    }

    /// Aggregate retry verdict for one outcome.
    ///
    /// Every condition is evaluated; the verdict is `true` if at least one of
    /// them asks for a retry. With no conditions the verdict is always `false`.
    pub fn must_retry(&self, outcome: &Result<R, E>) -> bool {
        self.matching_conditions(outcome) > 0
    }

    pub(crate) fn matching_conditions(&self, outcome: &Result<R, E>) -> usize {
        self.conditions
            .iter()
            .filter(|condition| condition.must_retry(outcome))
            .count()
    }
}

impl<R, E> Default for RetryPolicy<R, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, E> Clone for RetryPolicy<R, E> {
    fn clone(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            max_retries: self.max_retries,
            delay: self.delay,
            before_retry: self.before_retry.clone(),
            after_retry: self.after_retry.clone(),
            on_failure: self.on_failure.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<R, E> fmt::Debug for RetryPolicy<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("conditions", &self.conditions.len())
            .field("max_retries", &self.max_retries)
            .field("delay", &self.delay)
            .field("before_retry", &self.before_retry.is_some())
            .field("after_retry", &self.after_retry.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .field("suppress_failure", &self.fallback.is_some())
            .finish()
    }
}
