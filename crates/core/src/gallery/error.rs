//! Pipeline error types.

use pixy_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;
use crate::transform::TransformError;

/// Errors from the upload, retrieval and random pipelines.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Credential missing or wrong.
    #[error("invalid API key")]
    Forbidden,

    /// Upload request carried no files.
    #[error("no file uploaded")]
    NoFiles,

    /// Requested width or height exceeds the configured maximum.
    #[error("requested dimension {requested} exceeds maximum {max}")]
    DimensionTooLarge {
        /// Largest requested dimension.
        requested: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Random selection on a store with no images.
    #[error("no images available")]
    EmptyStore,

    /// Blob store failure, including unknown identifiers.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Image could not be decoded or encoded.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Blocking image task panicked or was cancelled.
    #[error("image task failed: {0}")]
    Task(String),
}

impl GalleryError {
    /// Create a dimension too large error.
    #[must_use]
    pub fn dimension_too_large(requested: u32, max: u32) -> Self {
        Self::DimensionTooLarge { requested, max }
    }
}

impl From<GalleryError> for AppError {
    fn from(err: GalleryError) -> Self {
        match err {
            GalleryError::Forbidden => Self::Forbidden(err.to_string()),
            GalleryError::NoFiles | GalleryError::DimensionTooLarge { .. } => {
                Self::BadRequest(err.to_string())
            }
            GalleryError::EmptyStore => Self::NotFound(err.to_string()),
            GalleryError::Storage(e) => e.into(),
            GalleryError::Transform(e) => e.into(),
            GalleryError::Task(_) => Self::Internal(err.to_string()),
        }
    }
}
