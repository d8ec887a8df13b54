//! Directory-backed blob store for uploaded images.
//!
//! Every image lives in one flat directory as `{id}{extension}`. There is no
//! index: the directory listing is the source of truth, so lookups are a
//! linear prefix scan.
//!
//! # Layout
//!
//! ```text
//! uploads/
//! ├── 1b4e28ba-2fa1-41d2-883f-0016d3cca427.png
//! ├── 6fa459ea-ee8a-4ca4-894e-db77e160355e.jpg
//! └── .inflight/                              (staged writes, never listed)
//! ```
//!
//! Access goes through an OpenDAL `Fs` operator whose atomic write directory
//! is the hidden `.inflight` staging area.

mod config;
mod error;
mod service;

pub use config::{INFLIGHT_DIR, StorageConfig};
pub use error::StorageError;
pub use service::BlobStore;
