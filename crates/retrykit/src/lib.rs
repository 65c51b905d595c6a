#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Policy-driven retries for fallible synchronous operations.
//!
//! Wrap any call returning `Result<R, E>` and describe when it must be
//! retried:
//!
//! - **Retry conditions** via the `RetryCondition` trait
//!   - error message (or any cause) contains a pattern, ignoring case
//!   - error is exactly of a given type, also behind `Box<dyn Error>`
//!   - caller-supplied predicate over the outcome
//!   - caller-supplied `RetryCondition` implementation
//! - **Bounded attempts** with a fixed, blocking delay between them
//! - **Lifecycle hooks** before and after each retry and on final failure
//! - **Failure suppression** returning a substitute value instead of the error
//!
//! # Semantics
//!
//! - Conditions are combined with a logical OR: one matching condition is
//!   enough to retry. With no conditions, the first outcome is final.
//! - `max_retries(n)` allows `n` retries after the first attempt.
//! - Errors that are not suppressed come back exactly as the operation
//!   returned them; nothing is wrapped.
//!
//! # Examples
//!
//! Using the prelude for convenient imports:
//!
//! ```rust
//! use retrykit::prelude::*;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut calls = 0;
//! let value = retry_wrap(|| {
//!     calls += 1;
//!     if calls < 2 {
//!         Err(std::io::Error::other("Service Unavailable"))
//!     } else {
//!         Ok(42)
//!     }
//! })
//! .when_message_contains("unavailable")?
//! .max_retries(3)
//! .delay(Duration::from_millis(10))
//! .execute()?;
//!
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod retry;

pub use retry::retry_wrap;

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use retrykit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::RetryConfig;
    pub use crate::error::ConfigError;
    pub use crate::retry::{
        CustomPredicate, ErrorConditions, ErrorKindIs, MessageContains, RetryBuilder,
        RetryCondition, RetryPolicy, retry_wrap,
    };
}
