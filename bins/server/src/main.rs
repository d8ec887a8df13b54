//! Pixy image server
//!
//! Main entry point for the image hosting service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixy_api::{AppState, create_router};
use pixy_core::access::AccessGate;
use pixy_core::gallery::ImageService;
use pixy_core::storage::{BlobStore, StorageConfig};
use pixy_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    let gate = AccessGate::new(config.api_key.clone());
    if gate.is_open() {
        warn!("No API key configured, every request is admitted");
    } else {
        info!("API key required on every request");
    }

    // Prepare storage directory
    let store = BlobStore::from_config(StorageConfig::from(&config.storage))?;
    info!(
        dir = %store.config().root.display(),
        max_dimension = config.storage.max_dimension,
        "Storage ready"
    );

    let images = ImageService::new(store, gate).with_max_dimension(config.storage.max_dimension);

    // Create application state
    let state = AppState {
        images: Arc::new(images),
        public_url: config.server.public_url.clone(),
        max_upload_bytes: config.storage.max_upload_bytes,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
