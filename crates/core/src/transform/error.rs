//! Transform error types.

use pixy_shared::AppError;
use thiserror::Error;

/// Errors from decoding or encoding image data.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Encoder rejected the decoded image.
    #[error("failed to encode {format}: {message}")]
    Encode {
        /// Target format name.
        format: &'static str,
        /// Encoder message.
        message: String,
    },
}

impl TransformError {
    /// Create a decode error.
    #[must_use]
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create an encode error.
    #[must_use]
    pub fn encode_failed(format: &'static str, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }
}

impl From<TransformError> for AppError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Decode(_) => Self::Decode(err.to_string()),
            TransformError::Encode { .. } => Self::Internal(err.to_string()),
        }
    }
}
