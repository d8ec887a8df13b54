//! Blob store implementation using Apache OpenDAL.

use std::path::Path;

use opendal::{Operator, services};
use pixy_shared::ImageId;
use tracing::debug;

use super::config::StorageConfig;
use super::error::StorageError;

/// Directory-backed image store.
#[derive(Debug, Clone)]
pub struct BlobStore {
    operator: Operator,
    config: StorageConfig,
}

impl BlobStore {
    /// Create a store from configuration.
    ///
    /// The root and its staging directory are created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem backend cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator over the root directory.
    fn create_operator(config: &StorageConfig) -> Result<Operator, StorageError> {
        let root = config
            .root
            .to_str()
            .ok_or_else(|| StorageError::configuration("invalid path"))?;
        let staging = config.atomic_write_dir();
        let staging = staging
            .to_str()
            .ok_or_else(|| StorageError::configuration("invalid path"))?;

        let builder = services::Fs::default().root(root).atomic_write_dir(staging);

        Ok(Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish())
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Derive the stored extension (with leading dot) from a client file name.
    ///
    /// Anything that is not a short run of ASCII alphanumerics is dropped, in
    /// which case the file is stored without an extension.
    #[must_use]
    pub fn extension_for(&self, filename: &str) -> String {
        sanitize_extension(filename, self.config.max_extension_len)
    }

    /// Write `bytes` as `{id}{extension}`, replacing any previous content.
    ///
    /// The backend stages the bytes in the hidden staging directory and
    /// renames them into place, so readers see either the old file or the
    /// new one. Returns the stored key.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is malformed or the write fails.
    pub async fn put(
        &self,
        id: ImageId,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        if !is_valid_extension(extension) {
            return Err(StorageError::InvalidExtension(extension.to_string()));
        }

        let key = format!("{id}{extension}");
        self.operator.write(&key, bytes.to_vec()).await?;

        debug!(id = %id, key = %key, size = bytes.len(), "Stored image");
        Ok(key)
    }

    /// Find the stored key for `id`.
    ///
    /// Callers do not know the extension, so this scans the listing for a
    /// name that is the identifier optionally followed by `.ext`. O(n) in the
    /// number of stored files.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no file matches, or an error if
    /// the directory cannot be listed.
    pub async fn resolve(&self, id: ImageId) -> Result<String, StorageError> {
        let wanted = id.to_string();

        self.list_all()
            .await?
            .into_iter()
            .find(|key| matches_id(key, &wanted))
            .ok_or_else(|| StorageError::not_found(wanted))
    }

    /// List the key of every stored file.
    ///
    /// Hidden entries (the staging directory included) and anything that is
    /// not a regular file are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed.
    pub async fn list_all(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.operator.list("/").await?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.metadata().is_file() && !entry.name().starts_with('.'))
            .map(|entry| entry.name().to_string())
            .collect())
    }

    /// Whether the store holds no images.
    ///
    /// # Errors
    ///
    /// Same as [`BlobStore::list_all`].
    pub async fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.list_all().await?.is_empty())
    }

    /// Read a stored file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        Ok(self.operator.read(key).await?.to_vec())
    }
}

fn matches_id(name: &str, id: &str) -> bool {
    name.strip_prefix(id)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

fn is_valid_extension(extension: &str) -> bool {
    extension.is_empty()
        || extension
            .strip_prefix('.')
            .is_some_and(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Sanitize the extension of an uploaded file name.
///
/// Only the final suffix is kept, lowercased. Suffixes with characters other
/// than ASCII alphanumerics, or longer than `max_len`, are dropped.
fn sanitize_extension(filename: &str, max_len: usize) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= max_len && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
