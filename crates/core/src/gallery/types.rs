//! Upload pipeline inputs and outputs.

use bytes::Bytes;
use pixy_shared::ImageId;

/// One file from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    /// Client-supplied file name. Empty when the form field held no file.
    pub filename: String,
    /// Raw file content.
    pub bytes: Bytes,
}

impl UploadFile {
    /// Create an upload file.
    #[must_use]
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// A successfully stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// Issued identifier.
    pub id: ImageId,
    /// Public link to the image.
    pub url: String,
}

/// A file rejected during recompression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    /// Client-supplied file name.
    pub filename: String,
    /// Why the file was rejected.
    pub reason: String,
}

/// Result of a batch upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOutcome {
    /// Stored images, in upload order.
    pub uploaded: Vec<UploadedImage>,
    /// Files that could not be decoded.
    pub failed: Vec<FailedUpload>,
}
