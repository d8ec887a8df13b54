//! Core image hosting logic for Pixy.
//!
//! This crate contains the storage, access and transformation logic with ZERO
//! web dependencies. The HTTP layer only parses requests and calls into
//! [`gallery::ImageService`].
//!
//! # Modules
//!
//! - `storage` - Directory-backed blob store keyed by image identifier
//! - `access` - Shared-secret access gate
//! - `transform` - Decode, resize and re-encode images
//! - `gallery` - Upload, retrieval and random selection pipelines

pub mod access;
pub mod gallery;
pub mod storage;
pub mod transform;
