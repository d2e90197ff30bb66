//! Camera frames handed to a classifier.

use std::path::Path;

use crate::error::{ImageError, Result};

/// An encoded camera frame (JPEG, PNG, ...). Classifiers decide how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraImage {
    bytes: Vec<u8>,
}

impl CameraImage {
    /// Wrap already-encoded image bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Read an image file from disk.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "Loaded camera image");
        Ok(Self { bytes })
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the encoded image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the image holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
