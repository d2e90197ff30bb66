//! Error types for the storage layer.

use catguard_core::SensorId;
use thiserror::Error;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested sensor is not in the store.
    #[error("sensor not found: {0}")]
    SensorNotFound(SensorId),

    /// A persisted status byte does not map to any known status.
    #[error("corrupt {field} value: {value}")]
    CorruptStatus {
        /// Which setting held the bad value.
        field: &'static str,
        /// The raw byte read back.
        value: u8,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
