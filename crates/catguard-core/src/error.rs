//! Common error types for catguard.
//!
//! This module provides shared error types that are used across multiple crates.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core errors that can occur throughout the catguard system.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No sensor matches the given reference (identifier or name).
    #[error("sensor not found: {0}")]
    SensorNotFound(String),
}
