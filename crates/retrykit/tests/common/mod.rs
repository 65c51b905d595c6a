//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

/// Application-style error with an optional cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    pub message: String,
    pub category: String,
    #[source]
    pub cause: Option<Box<AppError>>,
}

impl AppError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::kind("application", message)
    }

    pub fn kind(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: category.into(),
            cause: None,
        }
    }

    pub fn caused_by(mut self, cause: AppError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Build an error chain, outermost message first.
pub fn chain(messages: &[&str]) -> AppError {
    let (innermost, rest) = messages
        .split_last()
        .expect("chain needs at least one message");

    rest.iter()
        .rev()
        .fold(AppError::new(*innermost), |cause, message| {
            AppError::new(*message).caused_by(cause)
        })
}

/// Thread-safe call counter usable from operations and hooks.
#[derive(Debug, Default)]
pub struct Counter(AtomicU32);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a call and return the running total.
    pub fn hit(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}
