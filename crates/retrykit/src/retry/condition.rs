//! Retry conditions: the predicates that decide whether an attempt must be retried.

use crate::error::ConfigError;
use std::any::type_name;
use std::error::Error;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Maximum number of `source()` links followed when searching an error chain.
///
/// Well-formed errors never come close to this; it only stops a cyclic chain
/// from looping forever.
pub const MAX_CAUSE_DEPTH: usize = 32;

/// Marker for errors that implement [`Error`] themselves.
#[derive(Debug)]
pub enum Direct {}

/// Marker for boxed error trait objects such as `Box<dyn Error + Send + Sync>`.
#[derive(Debug)]
pub enum Boxed {}

/// View of an error value as a `dyn Error` trait object.
///
/// Boxed trait objects do not implement [`Error`], so they get their own
/// impls. `Via` only tells the two families apart and is always inferred.
///
/// # Examples
///
/// ```rust
/// use retrykit::retry::AsDynError;
/// use std::error::Error;
///
/// let boxed: Box<dyn Error + Send + Sync> = std::io::Error::other("disk full").into();
/// assert!(boxed.as_dyn_error().is::<std::io::Error>());
/// ```
pub trait AsDynError<Via = Direct> {
    /// The error as a trait object, so its runtime type and causes can be inspected.
    fn as_dyn_error(&self) -> &(dyn Error + 'static);
}

impl<T> AsDynError<Direct> for T
where
    T: Error + 'static,
{
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        self
    }
}

impl AsDynError<Boxed> for Box<dyn Error + 'static> {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl AsDynError<Boxed> for Box<dyn Error + Send + 'static> {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

impl AsDynError<Boxed> for Box<dyn Error + Send + Sync + 'static> {
    fn as_dyn_error(&self) -> &(dyn Error + 'static) {
        &**self
    }
}

/// Decides whether the outcome of an attempt requires another attempt.
///
/// Conditions are evaluated after every attempt. When several conditions are
/// registered on a policy, a single `true` is enough to trigger a retry.
///
/// Implement this trait to inject retry logic the built-in conditions do not
/// cover, then register it with
/// [`RetryBuilder::when_custom_strategy`](super::RetryBuilder::when_custom_strategy).
///
/// # Examples
///
/// ```rust
/// use retrykit::retry::RetryCondition;
///
/// /// Retry whenever the operation produced an odd number.
/// struct RetryOnOdd;
///
/// impl<E> RetryCondition<i64, E> for RetryOnOdd {
///     fn must_retry(&self, outcome: &Result<i64, E>) -> bool {
///         matches!(outcome, Ok(n) if n % 2 != 0)
///     }
/// }
///
/// assert!(RetryCondition::<i64, ()>::must_retry(&RetryOnOdd, &Ok(3)));
/// assert!(!RetryCondition::<i64, ()>::must_retry(&RetryOnOdd, &Ok(4)));
/// ```
pub trait RetryCondition<R, E>: Send + Sync {
    /// Returns `true` if the attempt that produced `outcome` must be retried.
    ///
    /// Implementations must not panic; evaluation happens inside the retry
    /// loop where a panic would abort the whole run.
    fn must_retry(&self, outcome: &Result<R, E>) -> bool;
}

impl<R, E, C> RetryCondition<R, E> for Arc<C>
where
    C: RetryCondition<R, E> + ?Sized,
{
    fn must_retry(&self, outcome: &Result<R, E>) -> bool {
        (**self).must_retry(outcome)
    }
}

impl<R, E, C> RetryCondition<R, E> for Box<C>
where
    C: RetryCondition<R, E> + ?Sized,
{
    fn must_retry(&self, outcome: &Result<R, E>) -> bool {
        (**self).must_retry(outcome)
    }
}

/// Retries when the error message, or the message of any error in its
/// `source()` chain, contains a pattern. Matching ignores case.
///
/// Successful outcomes never match, whatever value they carry.
///
/// # Examples
///
/// ```rust
/// use retrykit::retry::{MessageContains, RetryCondition};
///
/// let condition = MessageContains::new("timeout").unwrap();
/// let outcome: Result<(), std::io::Error> =
///     Err(std::io::Error::other("Request TIMEOUT after 30s"));
///
/// assert!(condition.must_retry(&outcome));
/// assert!(MessageContains::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContains {
    needle: String,
}

impl MessageContains {
    /// Create a condition matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyPattern`] if the pattern is empty, since
    /// such a pattern would match every error.
    pub fn new(pattern: impl Into<String>) -> crate::error::Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }

        Ok(Self {
            needle: pattern.to_lowercase(),
        })
    }

    /// The lowercased pattern this condition searches for.
    pub fn pattern(&self) -> &str {
        &self.needle
    }

    /// Search `error` and its causes for the pattern.
    pub fn matches(&self, error: &(dyn Error + 'static)) -> bool {
        let mut current = Some(error);
        let mut depth = 0;

        while let Some(err) = current {
            if depth > MAX_CAUSE_DEPTH {
                return false;
            }
            if err.to_string().to_lowercase().contains(&self.needle) {
                return true;
            }
            current = err.source();
            depth += 1;
        }

        false
    }
}

impl<R, E> RetryCondition<R, E> for MessageContains
where
    E: Error + 'static,
{
    fn must_retry(&self, outcome: &Result<R, E>) -> bool {
        match outcome {
            Err(err) => self.matches(err),
            Ok(_) => false,
        }
    }
}

/// Retries when the error's runtime type is exactly `K`.
///
/// This is an identity check on the error value itself. Errors of other
/// types are not matched, even if `K` appears further down their `source()`
/// chain. With a concrete error type the answer is the same for every
/// error; register it on an operation returning boxed errors to tell
/// several error types apart.
///
/// # Examples
///
/// ```rust
/// use retrykit::retry::{ErrorKindIs, RetryCondition};
///
/// let condition = ErrorKindIs::<std::io::Error>::new();
/// let outcome: Result<u8, std::io::Error> = Err(std::io::Error::other("boom"));
///
/// assert!(condition.must_retry(&outcome));
/// ```
pub struct ErrorKindIs<K> {
    _kind: PhantomData<fn() -> K>,
}

impl<K> ErrorKindIs<K>
where
    K: Error + 'static,
{
    /// Create a condition matching errors of type `K`.
    pub fn new() -> Self {
        Self { _kind: PhantomData }
    }

    /// Returns `true` if `error` is a `K`.
    pub fn matches(&self, error: &(dyn Error + 'static)) -> bool {
        error.is::<K>()
    }
}

impl<K> Default for ErrorKindIs<K>
where
    K: Error + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for ErrorKindIs<K> {
    fn clone(&self) -> Self {
        Self { _kind: PhantomData }
    }
}

impl<K> fmt::Debug for ErrorKindIs<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorKindIs")
            .field("kind", &type_name::<K>())
            .finish()
    }
}

impl<R, E, K> RetryCondition<R, E> for ErrorKindIs<K>
where
    E: Error + 'static,
    K: Error + 'static,
{
    fn must_retry(&self, outcome: &Result<R, E>) -> bool {
        match outcome {
            Err(err) => self.matches(err),
            Ok(_) => false,
        }
    }
}

/// Retries when a caller-supplied predicate returns `true`.
///
/// The predicate sees the whole outcome, so it can retry on unwanted
/// successful values as well as on errors.
///
/// # Examples
///
/// ```rust
/// use retrykit::retry::{CustomPredicate, RetryCondition};
///
/// let condition = CustomPredicate::new(|outcome: &Result<u32, ()>| {
///     matches!(outcome, Ok(50))
/// });
///
/// assert!(condition.must_retry(&Ok(50)));
/// assert!(!condition.must_retry(&Ok(100)));
/// ```
pub struct CustomPredicate<P> {
    predicate: P,
}

impl<P> CustomPredicate<P> {
    /// Wrap `predicate` as a retry condition.
    pub fn new(predicate: P) -> Self {
        Self { predicate }
    }
}

impl<P> fmt::Debug for CustomPredicate<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomPredicate").finish_non_exhaustive()
    }
}

impl<R, E, P> RetryCondition<R, E> for CustomPredicate<P>
where
    P: Fn(&Result<R, E>) -> bool + Send + Sync,
{
    fn must_retry(&self, outcome: &Result<R, E>) -> bool {
        (self.predicate)(outcome)
    }
}
