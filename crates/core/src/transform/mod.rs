//! Image transform engine.
//!
//! Decodes stored bytes, applies an optional resize and re-encodes:
//!
//! - [`transform`] serves images: output is always PNG.
//! - [`recompress`] runs once at upload: output keeps the source format.
//!
//! Both are synchronous and CPU-bound; async callers should run them on the
//! blocking pool.

mod engine;
mod error;
mod params;

pub use engine::{OUTPUT_CONTENT_TYPE, recompress, transform};
pub use error::TransformError;
pub use params::{TransformRequest, fit_within};
