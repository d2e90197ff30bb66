//! Classifiers that need no backend.

use rand::Rng;

use crate::error::Result;
use crate::image::CameraImage;
use crate::{validate_request, ImageClassifier};

/// Answers at random. Stands in for a real service in demos.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeImageClassifier;

impl FakeImageClassifier {
    /// Create a new fake classifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        validate_request(image, confidence_threshold)?;
        let cat = rand::thread_rng().gen_bool(0.5);
        tracing::debug!(cat, "Fake classification");
        Ok(cat)
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    answer: bool,
}

impl FixedClassifier {
    /// Create a classifier that always answers `answer`.
    #[must_use]
    pub const fn new(answer: bool) -> Self {
        Self { answer }
    }
}

impl ImageClassifier for FixedClassifier {
    fn image_contains_cat(&self, image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        validate_request(image, confidence_threshold)?;
        Ok(self.answer)
    }
}
