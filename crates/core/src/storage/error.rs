//! Storage error types.

use pixy_shared::AppError;
use thiserror::Error;

/// Blob store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No stored file carries the identifier.
    #[error("image not found: {id}")]
    NotFound {
        /// Identifier or key that was looked up.
        id: String,
    },

    /// Extension is not a dot followed by ASCII alphanumerics.
    #[error("invalid file extension: {0:?}")]
    InvalidExtension(String),

    /// Backend could not be initialized.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Backend operation failed.
    #[error("storage operation failed: {0}")]
    Operation(#[source] opendal::Error),
}

impl StorageError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                id: err.to_string(),
            },
            _ => Self::Operation(err),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id } => Self::NotFound(format!("image {id}")),
            other => Self::Storage(other.to_string()),
        }
    }
}
