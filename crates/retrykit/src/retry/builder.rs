//! Fluent builder tying an operation to a retry policy.

use super::condition::{AsDynError, CustomPredicate, ErrorKindIs, MessageContains, RetryCondition};
use super::policy::RetryPolicy;
use crate::config::RetryConfig;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Wrap `operation` so it can be retried.
///
/// This is the entry point of the crate. An action without a meaningful
/// return value is simply an operation returning `Result<(), E>`.
///
/// # Examples
///
/// ```rust
/// use retrykit::retry::{ErrorConditions, retry_wrap};
/// use std::time::Duration;
///
/// let mut attempts = 0;
/// let value = retry_wrap(|| {
///     attempts += 1;
///     if attempts < 3 {
///         Err(std::io::Error::other("connection timeout"))
///     } else {
///         Ok("payload")
///     }
/// })
/// .when_message_contains("timeout")?
/// .max_retries(3)
/// .delay(Duration::from_millis(1))
/// .execute()?;
///
/// assert_eq!(value, "payload");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn retry_wrap<F, R, E>(operation: F) -> RetryBuilder<F, R, E>
where
    F: FnMut() -> Result<R, E>,
{
    RetryBuilder::new(operation)
}

/// Builder accumulating a [`RetryPolicy`] around an operation.
///
/// Each configuration call consumes and returns the builder. Conditions
/// accumulate; scalar settings and hooks are overwritten by later calls.
/// [`execute`](Self::execute) runs the operation and can be called again
/// for a fresh run with the same configuration.
pub struct RetryBuilder<F, R, E> {
    operation: F,
    policy: RetryPolicy<R, E>,
}

impl<F, R, E> RetryBuilder<F, R, E>
where
    F: FnMut() -> Result<R, E>,
{
    /// Create a builder with an empty policy.
    pub fn new(operation: F) -> Self {
        Self::with_policy(operation, RetryPolicy::new())
    }

    /// Create a builder starting from an existing policy.
    pub fn with_policy(operation: F, policy: RetryPolicy<R, E>) -> Self {
        Self { operation, policy }
    }

    /// Run the operation under the configured policy.
    ///
    /// See [`RetryPolicy::execute`] for the exact semantics.
    pub fn execute(&mut self) -> Result<R, E> {
        self.policy.execute(&mut self.operation)
    }

    /// Set how many retries may follow the first attempt.
    ///
    /// Default: 0
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    /// Set the fixed pause between attempts.
    ///
    /// Default: no pause
    pub fn delay(mut self, delay: Duration) -> Self {
        self.policy.delay = delay;
        self
    }

    /// Set the fixed pause between attempts, in milliseconds.
    pub fn delay_ms(self, millis: u64) -> Self {
        self.delay(Duration::from_millis(millis))
    }

    /// Apply `max_retries` and `delay` from a loaded configuration.
    pub fn with_config(self, config: &RetryConfig) -> Self {
        self.max_retries(config.max_retries).delay(config.delay())
    }

    /// The policy assembled so far.
    pub fn policy(&self) -> &RetryPolicy<R, E> {
        &self.policy
    }

    /// Drop the operation and keep the policy for reuse elsewhere.
    pub fn into_policy(self) -> RetryPolicy<R, E> {
        self.policy
    }
}

impl<F, R, E> RetryBuilder<F, R, E>
where
    F: FnMut() -> Result<R, E>,
    R: 'static,
    E: 'static,
{
    /// Retry when `predicate` returns `true` for an outcome.
    pub fn when_custom<P>(self, predicate: P) -> Self
    where
        P: Fn(&Result<R, E>) -> bool + Send + Sync + 'static,
    {
        self.when_custom_strategy(CustomPredicate::new(predicate))
    }

    /// Retry when a caller-provided condition says so.
    pub fn when_custom_strategy<C>(mut self, condition: C) -> Self
    where
        C: RetryCondition<R, E> + 'static,
    {
        self.policy.conditions.push(Arc::new(condition));
        self
    }

    /// Call `hook` once with the final error when the run fails.
    ///
    /// Runs before failure suppression, so it also fires when a substitute
    /// value is returned.
    pub fn on_failure<H>(mut self, hook: H) -> Self
    where
        H: Fn(&E) + Send + Sync + 'static,
    {
        self.policy.on_failure = Some(Arc::new(hook));
        self
    }

    /// Call `hook` before each retry. It is never called before the first attempt.
    pub fn before_retry<H>(mut self, hook: H) -> Self
    where
        H: Fn() + Send + Sync + 'static,
    {
        self.policy.before_retry = Some(Arc::new(hook));
        self
    }

    /// Call `hook` with the outcome of each retry. It is never called for the
    /// first attempt.
    pub fn after_retry<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Result<R, E>) + Send + Sync + 'static,
    {
        self.policy.after_retry = Some(Arc::new(hook));
        self
    }

    /// Return `R::default()` instead of the error when the run fails.
    pub fn suppress_failure(mut self) -> Self
    where
        R: Default,
    {
        self.policy.fallback = Some(Arc::new(R::default));
        self
    }

    /// Return `value` instead of the error when the run fails.
    pub fn suppress_failure_with(mut self, value: R) -> Self
    where
        R: Clone + Send + Sync,
    {
        self.policy.fallback = Some(Arc::new(move || value.clone()));
        self
    }
}

/// Conditions that inspect the error value of an attempt.
///
/// Implemented for every [`RetryBuilder`] whose error type is either an
/// [`Error`] or a boxed `dyn Error`. `Via` is inferred from the error type and
/// never needs to be written out; bring the trait into scope with the
/// [`prelude`](crate::prelude).
pub trait ErrorConditions<Via>: Sized {
    /// Retry when the error message or any of its causes contains `pattern`,
    /// ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPattern`](crate::error::ConfigError::EmptyPattern)
    /// if `pattern` is empty.
    fn when_message_contains(self, pattern: impl Into<String>) -> crate::error::Result<Self>;

    /// Retry when the runtime type of the error is exactly `K`.
    fn when_error_kind_is<K>(self) -> Self
    where
        K: Error + 'static;
}

impl<F, R, E, Via> ErrorConditions<Via> for RetryBuilder<F, R, E>
where
    F: FnMut() -> Result<R, E>,
    R: 'static,
    E: AsDynError<Via> + 'static,
    Via: 'static,
{
    fn when_message_contains(self, pattern: impl Into<String>) -> crate::error::Result<Self> {
        let condition = MessageContains::new(pattern)?;
        Ok(self.when_custom(move |outcome| match outcome {
            Err(err) => condition.matches(AsDynError::<Via>::as_dyn_error(err)),
            Ok(_) => false,
        }))
    }

    fn when_error_kind_is<K>(self) -> Self
    where
        K: Error + 'static,
    {
        let condition = ErrorKindIs::<K>::new();
        self.when_custom(move |outcome| match outcome {
            Err(err) => condition.matches(AsDynError::<Via>::as_dyn_error(err)),
            Ok(_) => false,
        })
    }
}

impl<F, R, E> fmt::Debug for RetryBuilder<F, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryBuilder")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
