//! Retry conditions, policies and the execution loop.
//!
//! # Key Types
//!
//! - [`RetryCondition`] - Capability deciding whether an outcome must be retried
//! - [`RetryPolicy`] - Conditions, budget, delay, hooks and failure suppression
//! - [`RetryBuilder`] - Fluent surface returned by [`retry_wrap`]
//! - [`ErrorConditions`] - Message and type conditions for concrete or boxed errors
//!
//! # Examples
//!
//! ```rust
//! use retrykit::retry::{ErrorConditions, retry_wrap};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("database is locked")]
//! struct Locked;
//!
//! let retries = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&retries);
//! let mut attempts = 0;
//!
//! let saved = retry_wrap(|| {
//!     attempts += 1;
//!     if attempts == 1 { Err(Locked) } else { Ok(()) }
//! })
//! .when_error_kind_is::<Locked>()
//! .max_retries(2)
//! .before_retry(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! })
//! .execute();
//!
//! assert!(saved.is_ok());
//! assert_eq!(retries.load(Ordering::SeqCst), 1);
//! ```

mod builder;
mod condition;
mod executor;
mod policy;

pub use builder::{ErrorConditions, RetryBuilder, retry_wrap};
pub use condition::{
    AsDynError, Boxed, CustomPredicate, Direct, ErrorKindIs, MAX_CAUSE_DEPTH, MessageContains,
    RetryCondition,
};
pub use policy::{
    AfterRetryHook, BeforeRetryHook, Fallback, FailureHook, RetryPolicy, SharedCondition,
};
