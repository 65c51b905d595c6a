//! Configuration error types

use thiserror::Error;

/// Result type for retry configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while assembling a retry policy.
///
/// These surface at configuration time, before the operation ever runs.
/// Errors produced by the wrapped operation are never converted into this
/// type; `execute` hands them back to the caller untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A message condition was given an empty or whitespace-only pattern
    #[error("message pattern must not be empty")]
    EmptyPattern,
}
