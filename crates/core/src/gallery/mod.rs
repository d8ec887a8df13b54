//! Image hosting pipelines.
//!
//! This module ties the blob store, access gate and transform engine together
//! into the three request flows:
//! - Upload: gate, persist each file, recompress it in place
//! - Retrieval: gate, resolve the identifier, transform
//! - Random selection: gate, pick uniformly from the store, transform

mod error;
mod service;
mod types;

pub use error::GalleryError;
pub use service::ImageService;
pub use types::{FailedUpload, UploadFile, UploadOutcome, UploadedImage};
