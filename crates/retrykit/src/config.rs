//! Serializable retry settings.
//!
//! Retry budgets usually belong in application configuration rather than in
//! code. [`RetryConfig`] deserializes from any serde format and is applied to
//! a builder with [`RetryBuilder::with_config`](crate::retry::RetryBuilder::with_config).
//!
//! ```rust
//! use retrykit::config::RetryConfig;
//! use std::time::Duration;
//!
//! let config: RetryConfig = serde_json::from_str(r#"{ "max_retries": 5, "delay_ms": 250 }"#)?;
//! assert_eq!(config.delay(), Duration::from_millis(250));
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry budget and pacing.
///
/// Missing fields fall back to [`RetryConfig::default`]: no retries, no delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,

    /// Pause between attempts, in milliseconds.
    pub delay_ms: u64,
}

impl RetryConfig {
    /// Create a configuration with the given budget and delay.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay_ms: saturating_millis(delay),
        }
    }

    /// The delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Whole milliseconds in `duration`, clamped to `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
