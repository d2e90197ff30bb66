//! Error types for the security controller.
//!
//! This module defines all errors that can occur while the controller
//! processes sensor, image, and arming events.

use catguard_core::SensorId;
use thiserror::Error;

/// A result type using `ControlError`.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors that can occur in controller operations.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The sensor is not tracked by the controller.
    #[error("unknown sensor: {0}")]
    UnknownSensor(SensorId),

    /// The image classifier failed. No retry is attempted.
    #[error("image classification failed: {0}")]
    Classification(#[from] catguard_image::ImageError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] catguard_store::StoreError),

    /// Identifier or lookup error.
    #[error(transparent)]
    Core(#[from] catguard_core::CoreError),
}

impl ControlError {
    /// Returns true if this error might be resolved by retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::Store(catguard_store::StoreError::Database(_))
                | Self::Classification(catguard_image::ImageError::Unavailable(_))
        )
    }
}
