//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Credential missing or wrong.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Malformed request or empty upload.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown identifier or empty store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored or uploaded bytes are not a decodable image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Filesystem failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden(_) => 403,
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Decode(_) => 422,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to clients.
    ///
    /// Storage and internal failures carry paths and OS details that stay in
    /// the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => "Storage operation failed".to_string(),
            Self::Internal(_) => "An error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
