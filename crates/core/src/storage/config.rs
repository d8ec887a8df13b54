//! Storage configuration types.

use std::path::PathBuf;

use pixy_shared::StorageSettings;

/// Blob store configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Flat directory holding every stored image.
    pub root: PathBuf,
    /// Longest extension (without the dot) kept from an uploaded file name.
    pub max_extension_len: usize,
}

/// Hidden directory under the root where in-flight writes are staged.
pub const INFLIGHT_DIR: &str = ".inflight";

impl StorageConfig {
    /// Default maximum extension length.
    pub const DEFAULT_MAX_EXTENSION_LEN: usize = 16;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_extension_len: Self::DEFAULT_MAX_EXTENSION_LEN,
        }
    }

    /// Set maximum extension length.
    #[must_use]
    pub fn with_max_extension_len(mut self, len: usize) -> Self {
        self.max_extension_len = len;
        self
    }

    /// Staging directory for atomic writes.
    #[must_use]
    pub fn atomic_write_dir(&self) -> PathBuf {
        self.root.join(INFLIGHT_DIR)
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(settings.dir.clone())
    }
}
