//! Error types for image classification.

use std::path::PathBuf;

use thiserror::Error;

/// A result type using `ImageError`.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors raised while loading or classifying an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The confidence threshold is outside `0.0..=100.0`.
    #[error("confidence threshold {0} is outside 0..=100")]
    InvalidThreshold(f32),

    /// The image holds no data.
    #[error("image is empty")]
    EmptyImage,

    /// The image file could not be read.
    #[error("failed to read image {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The classification backend failed.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
}
