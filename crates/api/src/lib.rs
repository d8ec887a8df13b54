//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - Image upload, retrieval and random selection routes
//! - Credential and base URL extractors
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use pixy_core::gallery::ImageService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Image hosting pipelines.
    pub images: Arc<ImageService>,
    /// Externally visible base URL for image links.
    pub public_url: Option<String>,
    /// Request body cap for uploads, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create state with no public URL and the default 16 MiB upload cap.
    #[must_use]
    pub fn new(images: Arc<ImageService>) -> Self {
        Self {
            images,
            public_url: None,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
