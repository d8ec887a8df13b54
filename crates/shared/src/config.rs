//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Image storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Shared secret required on every request. `None` leaves the service open.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible base URL used to build image links.
    ///
    /// When unset, links are built from the request's `Host` header.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5100
}

/// Image storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the uploaded files.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
    /// Maximum request body size for uploads, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Largest width or height a client may request.
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            max_dimension: default_max_dimension(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_max_dimension() -> u32 {
    10_000
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// The bare `API_KEY` variable takes precedence over `PIXY__API_KEY` and
    /// config files. An empty key is treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PIXY").separator("__"))
            .set_override_option("api_key", std::env::var("API_KEY").ok())?
            .build()?;

        let mut app: Self = config.try_deserialize()?;
        app.api_key = app.api_key.filter(|key| !key.is_empty());
        Ok(app)
    }

    /// Address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
