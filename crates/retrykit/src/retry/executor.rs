//! The retry loop.
//!
//! One call to [`RetryPolicy::execute`] is one run:
//!
//! ```text
//! Attempting -> Deciding -> Retrying -> Attempting ...
//!                        \-> Terminated(Success | Failure)
//! ```
//!
//! Attempt counters live on the stack of a single run, so a policy can be
//! executed repeatedly without state leaking between runs.

use super::policy::RetryPolicy;
use crate::config::saturating_millis;
use std::thread;
use tracing::{debug, trace, warn};

/// What the loop does after an attempt has been judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    /// Sleep for the configured delay, then attempt again.
    Retry,
    /// Leave the loop with the last outcome.
    Stop,
}

/// Per-run mutable state.
#[derive(Debug, Default)]
struct ExecutionRun {
    /// Retries granted so far. Incremented once per positive verdict, not per attempt.
    attempts: u32,
    /// The previous verdict granted a retry, so the next attempt is a retry.
    retrying: bool,
    /// The run ended on an outcome without an error.
    succeeded: bool,
}

impl ExecutionRun {
    fn is_retry(&self) -> bool {
        self.retrying
    }

    /// Apply the retry budget to a raw verdict.
    fn decide(&mut self, must_retry: bool, succeeded: bool, max_retries: u32) -> Decision {
        let mut retry = must_retry;
        if retry {
            self.attempts += 1;
            if self.attempts > max_retries {
                retry = false;
            }
        }

        self.retrying = retry;
        if retry {
            Decision::Retry
        } else {
            self.succeeded = succeeded;
            Decision::Stop
        }
    }
}

impl<R, E> RetryPolicy<R, E> {
    /// Run `operation` under this policy.
    ///
    /// The operation is attempted once, then again for as long as at least
    /// one condition asks for a retry and the retry budget allows it, so it
    /// runs at most `max_retries + 1` times.
    ///
    /// # Returns
    ///
    /// - `Ok(value)` from the last attempt if it succeeded
    /// - `Ok(substitute)` if the last attempt failed and failures are suppressed
    /// - `Err(error)` otherwise: the very error the last attempt returned
    ///
    /// # Panics
    ///
    /// Panics raised by the operation, a condition or a hook are not caught;
    /// they unwind out of this call and abort the run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retrykit::retry::{ErrorConditions, retry_wrap};
    /// use std::cell::Cell;
    ///
    /// let calls = Cell::new(0);
    /// let policy = retry_wrap(|| -> Result<u32, std::io::Error> { Ok(0) })
    ///     .when_message_contains("busy")
    ///     .unwrap()
    ///     .max_retries(3)
    ///     .into_policy();
    ///
    /// let value = policy.execute(|| {
    ///     calls.set(calls.get() + 1);
    ///     if calls.get() < 3 {
    ///         Err(std::io::Error::other("resource busy"))
    ///     } else {
    ///         Ok(7)
    ///     }
    /// });
    ///
    /// assert_eq!(value.unwrap(), 7);
    /// assert_eq!(calls.get(), 3);
    /// ```
    pub fn execute<F>(&self, mut operation: F) -> Result<R, E>
    where
        F: FnMut() -> Result<R, E>,
    {
        let mut run = ExecutionRun::default();

        loop {
            if run.is_retry() {
                if let Some(hook) = &self.before_retry {
                    hook();
                }
            }

            let outcome = operation();
            trace!(
                retry = run.is_retry(),
                failed = outcome.is_err(),
                "attempt finished"
            );

            if run.is_retry() {
                if let Some(hook) = &self.after_retry {
                    hook(&outcome);
                }
            }

            let matched = self.matching_conditions(&outcome);
            let decision = run.decide(matched > 0, outcome.is_ok(), self.max_retries);

            match decision {
                Decision::Retry => {
                    debug!(
                        attempt = run.attempts,
                        max_retries = self.max_retries,
                        matched_conditions = matched,
                        delay_ms = saturating_millis(self.delay),
                        "retrying operation"
                    );
                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
                Decision::Stop => {
                    if matched > 0 {
                        warn!(
                            max_retries = self.max_retries,
                            "retry budget exhausted"
                        );
                    }
                    return self.terminate(outcome, &run);
                }
            }
        }
    }

    /// Turn the final outcome of a run into the caller-visible result.
    fn terminate(&self, outcome: Result<R, E>, run: &ExecutionRun) -> Result<R, E> {
        let error = match outcome {
            Ok(value) => {
                debug_assert!(run.succeeded);
                return Ok(value);
            }
            Err(error) => error,
        };

        if let Some(hook) = &self.on_failure {
            hook(&error);
        }

        match &self.fallback {
            Some(fallback) => {
                debug!(retries = run.attempts, "suppressing failure with substitute value");
                Ok(fallback())
            }
            None => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::condition::{CustomPredicate, MessageContains};
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn always_retry() -> Arc<CustomPredicate<fn(&Result<u32, io::Error>) -> bool>> {
        fn always(_: &Result<u32, io::Error>) -> bool {
            true
        }
        Arc::new(CustomPredicate::new(always as fn(&Result<u32, io::Error>) -> bool))
    }

    #[test]
    fn test_run_decide_respects_budget() {
        let mut run = ExecutionRun::default();

        assert_eq!(run.decide(true, false, 2), Decision::Retry);
        assert!(run.is_retry());
        assert_eq!(run.decide(true, false, 2), Decision::Retry);
        assert_eq!(run.decide(true, false, 2), Decision::Stop);
        assert_eq!(run.attempts, 3);
        assert!(!run.is_retry());
        assert!(!run.succeeded);
    }

    #[test]
    fn test_run_zero_budget_stops_immediately() {
        let mut run = ExecutionRun::default();

        assert_eq!(run.decide(true, true, 0), Decision::Stop);
        assert!(run.succeeded);
    }

    #[test]
    fn test_run_negative_verdict_does_not_count() {
        let mut run = ExecutionRun::default();

        assert_eq!(run.decide(false, true, 5), Decision::Stop);
        assert_eq!(run.attempts, 0);
        assert!(run.succeeded);
    }

    #[test]
    fn test_execute_without_conditions_runs_once() {
        let policy: RetryPolicy<u32, io::Error> = RetryPolicy {
            max_retries: 10,
            ..RetryPolicy::new()
        };
        let calls = AtomicU32::new(0);

        let result = policy.execute(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("timeout"))
        });

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_execute_exhausts_budget() {
        let mut policy: RetryPolicy<u32, io::Error> = RetryPolicy::new();
        policy.conditions.push(always_retry());
        policy.max_retries = 3;
        let calls = AtomicU32::new(0);

        let result = policy.execute(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other(format!("failure {}", n + 1)))
        });

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.unwrap_err().to_string(), "failure 4");
    }

    #[test]
    fn test_execute_retries_on_unwanted_value() {
        let mut policy: RetryPolicy<u32, io::Error> = RetryPolicy::new();
        policy
            .conditions
            .push(Arc::new(CustomPredicate::new(|outcome: &Result<u32, io::Error>| {
                matches!(outcome, Ok(50))
            })));
        policy.max_retries = 10;
        let calls = AtomicU32::new(0);

        let result = policy.execute(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(if n == 0 { 50 } else { 100 })
        });

        assert_eq!(result.unwrap(), 100);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_execute_exhausted_on_value_returns_last_value() {
        let mut policy: RetryPolicy<u32, io::Error> = RetryPolicy::new();
        policy.conditions.push(always_retry());
        policy.max_retries = 2;
        let failures = Arc::new(AtomicU32::new(0));
        let failures_hook = Arc::clone(&failures);
        policy.on_failure = Some(Arc::new(move |_: &io::Error| {
            failures_hook.fetch_add(1, Ordering::SeqCst);
        }));
        let calls = AtomicU32::new(0);

        let result = policy.execute(|| Ok(calls.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(result.unwrap(), 2);
        assert_eq!(failures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_hooks_skip_first_attempt() {
        let before = Arc::new(AtomicU32::new(0));
        let after = Arc::new(AtomicU32::new(0));

        let mut policy: RetryPolicy<u32, io::Error> = RetryPolicy::new();
        policy
            .conditions
            .push(Arc::new(MessageContains::new("timeout").unwrap()));
        policy.max_retries = 5;
        let before_hook = Arc::clone(&before);
        policy.before_retry = Some(Arc::new(move || {
            before_hook.fetch_add(1, Ordering::SeqCst);
        }));
        let after_hook = Arc::clone(&after);
        policy.after_retry = Some(Arc::new(move |_: &Result<u32, io::Error>| {
            after_hook.fetch_add(1, Ordering::SeqCst);
        }));

        let calls = AtomicU32::new(0);
        let result = policy.execute(|| {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(io::Error::other("timeout"))
            } else {
                Ok(1)
            }
        });

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(before.load(Ordering::SeqCst), 2);
        assert_eq!(after.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_fallback_replaces_error() {
        let mut policy: RetryPolicy<u32, io::Error> = RetryPolicy::new();
        policy.conditions.push(always_retry());
        policy.max_retries = 1;
        policy.fallback = Some(Arc::new(|| 42));

        let result = policy.execute(|| Err(io::Error::other("down")));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_delay_applies_between_retries() {
        let mut policy: RetryPolicy<u32, io::Error> = RetryPolicy::new();
        policy.conditions.push(always_retry());
        policy.max_retries = 2;
        policy.delay = Duration::from_millis(20);

        let start = std::time::Instant::now();
        let _ = policy.execute(|| Err(io::Error::other("slow")));

        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
