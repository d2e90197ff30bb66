//! Image classification for catguard.
//!
//! The security controller does not look at pixels itself. It hands each
//! camera frame to an [`ImageClassifier`] together with a confidence threshold
//! and gets back a yes/no answer: does this frame show a cat?
//!
//! # Adapters
//!
//! - [`LabelClassifier`]: wraps any [`LabelDetector`] (a service that returns
//!   labelled objects with confidences) and answers by looking for a `cat`
//!   label.
//! - [`FakeImageClassifier`]: answers at random, for demos without a backend.
//! - [`FixedClassifier`]: always gives the same answer.
//!
//! # Example
//!
//! ```
//! use catguard_image::{CameraImage, FixedClassifier, ImageClassifier};
//!
//! let classifier = FixedClassifier::new(true);
//! let image = CameraImage::from_bytes(vec![0xff, 0xd8]);
//! assert!(classifier.image_contains_cat(&image, 50.0).unwrap());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod fake;
pub mod image;
pub mod labels;

use std::sync::Arc;

pub use error::{ImageError, Result};
pub use fake::{FakeImageClassifier, FixedClassifier};
pub use image::CameraImage;
pub use labels::{Label, LabelClassifier, LabelDetector};

/// Decides whether a camera frame shows a cat.
pub trait ImageClassifier: Send + Sync {
    /// Returns true if `image` depicts a cat with at least
    /// `confidence_threshold` percent confidence.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::InvalidThreshold` for thresholds outside
    /// `0.0..=100.0`, `ImageError::EmptyImage` for empty frames, and any
    /// backend failure as-is.
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool>;
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for Arc<T> {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        (**self).image_contains_cat(image, confidence_threshold)
    }
}

impl<T: ImageClassifier + ?Sized> ImageClassifier for Box<T> {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        (**self).image_contains_cat(image, confidence_threshold)
    }
}

/// Check the common preconditions every classifier enforces.
///
/// # Errors
///
/// Returns `ImageError::InvalidThreshold` or `ImageError::EmptyImage`.
pub fn validate_request(image: &CameraImage, confidence_threshold: f32) -> Result<()> {
    if !(0.0..=100.0).contains(&confidence_threshold) {
        return Err(ImageError::InvalidThreshold(confidence_threshold));
    }
    if image.is_empty() {
        return Err(ImageError::EmptyImage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_bounds() {
        let image = CameraImage::from_bytes(vec![1u8]);
        assert!(validate_request(&image, 0.0).is_ok());
        assert!(validate_request(&image, 100.0).is_ok());
        assert!(matches!(
            validate_request(&image, 100.5),
            Err(ImageError::InvalidThreshold(_))
        ));
        assert!(matches!(
            validate_request(&image, -1.0),
            Err(ImageError::InvalidThreshold(_))
        ));
        assert!(matches!(
            validate_request(&image, f32::NAN),
            Err(ImageError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn empty_image_rejected() {
        let image = CameraImage::from_bytes(Vec::new());
        assert!(matches!(
            validate_request(&image, 50.0),
            Err(ImageError::EmptyImage)
        ));
    }

    #[test]
    fn shared_classifier() {
        let classifier: Arc<dyn ImageClassifier> = Arc::new(FixedClassifier::new(false));
        let image = CameraImage::from_bytes(vec![1u8]);
        assert!(!classifier.image_contains_cat(&image, 50.0).unwrap());
    }
}
