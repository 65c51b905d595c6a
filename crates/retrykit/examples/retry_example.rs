//! Example: Retrying a flaky operation with retrykit
//!
//! This example demonstrates:
//! 1. Retrying on an error message with a fixed delay
//! 2. Retrying on an unwanted value with a custom predicate
//! 3. Hooks and failure suppression when the budget runs out
//!
//! Run with:
//! ```bash
//! RUST_LOG=retrykit=debug cargo run -p retrykit --example retry_example
//! ```

use retrykit::prelude::*;
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Errors returned by the simulated service
#[derive(Debug, thiserror::Error)]
enum ServiceError {
    #[error("request failed: {0}")]
    Request(#[source] std::io::Error),
    #[error("unauthorized")]
    Unauthorized,
}

/// A simulated service that fails the first few times
struct UnreliableService {
    attempts: AtomicU32,
    fail_count: u32,
}

impl UnreliableService {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
        }
    }

    fn call(&self) -> Result<String, ServiceError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.fail_count {
            println!("  Attempt {}: FAILED (connection timed out)", attempt);
            Err(ServiceError::Request(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "connection timed out",
            )))
        } else {
            println!("  Attempt {}: SUCCESS", attempt);
            Ok("service response".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: Retry on a message found anywhere in the error chain
fn example_message_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Retry on Error Message ===\n");

    let service = UnreliableService::new(2);
    let start = Instant::now();

    let response = retry_wrap(|| service.call())
        .when_message_contains("timed out")?
        .max_retries(3)
        .delay(Duration::from_millis(100))
        .execute()?;

    println!("\nResult: {}", response);
    println!("Total attempts: {}", service.total_attempts());
    println!("Total time: {:?} (expected ~200ms)", start.elapsed());

    Ok(())
}

/// Example 2: Retry until the operation produces an acceptable value
fn example_value_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Retry on Unwanted Value ===\n");

    let readings = [17u32, 19, 42];
    let next = AtomicU32::new(0);

    let reading = retry_wrap(|| {
        let index = next.fetch_add(1, Ordering::SeqCst) as usize;
        let value = readings[index.min(readings.len() - 1)];
        println!("  Reading: {}", value);
        Ok::<_, ServiceError>(value)
    })
    .when_custom(|outcome| matches!(outcome, Ok(value) if value % 2 != 0))
    .max_retries(5)
    .execute()?;

    println!("\nAccepted even reading: {}", reading);

    Ok(())
}

/// Example 3: Hooks and a substitute value when every attempt fails
fn example_suppressed_failure() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Hooks and Failure Suppression ===\n");

    let retries = Arc::new(AtomicU32::new(0));
    let retries_hook = Arc::clone(&retries);

    let token = retry_wrap(|| Err::<String, _>(ServiceError::Unauthorized))
        .when_custom(|outcome| matches!(outcome, Err(ServiceError::Unauthorized)))
        .max_retries(2)
        .before_retry(move || {
            let n = retries_hook.fetch_add(1, Ordering::SeqCst) + 1;
            println!("  Refreshing credentials before retry {}", n);
        })
        .after_retry(|outcome| println!("  Retry outcome: {:?}", outcome))
        .on_failure(|err| println!("  Giving up: {}", err))
        .suppress_failure_with("anonymous".to_string())
        .execute()?;

    println!("\nFalling back to token: {}", token);
    println!("Retries performed: {}", retries.load(Ordering::SeqCst));

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("RetryKit Examples");
    println!("=================");

    example_message_retry()?;
    example_value_retry()?;
    example_suppressed_failure()?;

    println!("\n=== All examples completed ===\n");

    Ok(())
}
