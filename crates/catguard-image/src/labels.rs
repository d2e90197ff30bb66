//! Classification on top of a label-detection service.
//!
//! Object-detection services return a list of labels ("Cat", "Animal",
//! "Furniture", ...) each with a confidence percentage. [`LabelClassifier`]
//! turns that into the yes/no answer the controller needs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::CameraImage;
use crate::{validate_request, ImageClassifier};

/// Label matched by default.
pub const DEFAULT_TARGET_LABEL: &str = "cat";

/// A detected object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Object name as reported by the detector.
    pub name: String,
    /// Detector confidence, 0 to 100.
    pub confidence: f32,
}

impl Label {
    /// Create a label.
    #[must_use]
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// A backend that lists the objects it sees in an image.
pub trait LabelDetector: Send + Sync {
    /// Detect labels with at least `min_confidence` percent confidence.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Unavailable` (or another `ImageError`) when the
    /// backend cannot answer.
    fn detect_labels(&self, image: &CameraImage, min_confidence: f32) -> Result<Vec<Label>>;
}

impl<T: LabelDetector + ?Sized> LabelDetector for Arc<T> {
    fn detect_labels(&self, image: &CameraImage, min_confidence: f32) -> Result<Vec<Label>> {
        (**self).detect_labels(image, min_confidence)
    }
}

/// Answers "is there a cat?" by looking for a target label.
#[derive(Debug)]
pub struct LabelClassifier<D> {
    detector: D,
    target: String,
}

impl<D: LabelDetector> LabelClassifier<D> {
    /// Classify with `detector`, matching the `cat` label.
    #[must_use]
    pub fn new(detector: D) -> Self {
        Self::with_target(detector, DEFAULT_TARGET_LABEL)
    }

    /// Classify with `detector`, matching `target` (case-insensitive).
    #[must_use]
    pub fn with_target(detector: D, target: impl Into<String>) -> Self {
        Self {
            detector,
            target: target.into(),
        }
    }

    /// The wrapped detector.
    #[must_use]
    pub const fn detector(&self) -> &D {
        &self.detector
    }
}

impl<D: LabelDetector> ImageClassifier for LabelClassifier<D> {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        validate_request(image, confidence_threshold)?;

        let labels = self.detector.detect_labels(image, confidence_threshold)?;
        for label in &labels {
            tracing::debug!(name = %label.name, confidence = label.confidence, "Detected label");
        }

        // Detectors are not trusted to apply the minimum themselves.
        Ok(labels.iter().any(|label| {
            label.confidence >= confidence_threshold
                && label.name.eq_ignore_ascii_case(&self.target)
        }))
    }
}
