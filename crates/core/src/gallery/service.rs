//! Image hosting service.

use std::str::FromStr;

use pixy_shared::ImageId;
use rand::seq::IndexedRandom;
use tracing::{debug, info, warn};

use super::error::GalleryError;
use super::types::{FailedUpload, UploadFile, UploadOutcome, UploadedImage};
use crate::access::AccessGate;
use crate::storage::{BlobStore, StorageError};
use crate::transform::{self, TransformError, TransformRequest};

/// Upload, retrieval and random selection over one blob store.
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Debug)]
pub struct ImageService {
    store: BlobStore,
    gate: AccessGate,
    max_dimension: u32,
}

impl ImageService {
    /// Default cap on requested width or height.
    pub const DEFAULT_MAX_DIMENSION: u32 = 10_000;

    /// Create a new image service.
    #[must_use]
    pub fn new(store: BlobStore, gate: AccessGate) -> Self {
        Self {
            store,
            gate,
            max_dimension: Self::DEFAULT_MAX_DIMENSION,
        }
    }

    /// Set maximum requested dimension.
    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Get the blob store.
    #[must_use]
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Get the access gate.
    #[must_use]
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// Reject requests whose credential does not pass the gate.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Forbidden`] on a missing or wrong credential.
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), GalleryError> {
        if self.gate.check(credential) {
            Ok(())
        } else {
            Err(GalleryError::Forbidden)
        }
    }

    /// Store a batch of uploaded files.
    ///
    /// Each named file gets a fresh identifier, is written as-is, then
    /// recompressed and written again. A file that fails to decode is
    /// reported in [`UploadOutcome::failed`] without affecting the rest of the
    /// batch; its raw bytes stay in the store. Files with an empty name are
    /// skipped. Links are `base_url` followed by the identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential is rejected
    /// - `files` is empty
    /// - A storage write fails (aborts the remaining batch)
    pub async fn upload(
        &self,
        credential: Option<&str>,
        files: Vec<UploadFile>,
        base_url: &str,
    ) -> Result<UploadOutcome, GalleryError> {
        self.authorize(credential)?;

        if files.is_empty() {
            return Err(GalleryError::NoFiles);
        }

        let mut outcome = UploadOutcome::default();

        for file in files {
            if file.filename.is_empty() {
                debug!("Skipping form entry without a file name");
                continue;
            }

            let id = ImageId::new();
            let extension = self.store.extension_for(&file.filename);
            self.store.put(id, &extension, &file.bytes).await?;

            let raw = file.bytes.clone();
            match run_blocking(move || transform::recompress(&raw)).await {
                Ok(compressed) => {
                    self.store.put(id, &extension, &compressed).await?;
                    info!(
                        image_id = %id,
                        filename = %file.filename,
                        original_size = file.bytes.len(),
                        stored_size = compressed.len(),
                        "Image uploaded"
                    );
                    outcome.uploaded.push(UploadedImage {
                        id,
                        url: image_url(base_url, id),
                    });
                }
                Err(GalleryError::Transform(e)) => {
                    warn!(image_id = %id, filename = %file.filename, error = %e, "Rejected upload");
                    outcome.failed.push(FailedUpload {
                        filename: file.filename,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    /// Serve the image stored under `identifier` as PNG.
    ///
    /// Anything that is not a canonical identifier is simply not found.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential is rejected
    /// - A requested dimension exceeds the maximum
    /// - No image has the identifier
    /// - The stored bytes cannot be read or decoded
    pub async fn fetch(
        &self,
        credential: Option<&str>,
        identifier: &str,
        request: TransformRequest,
    ) -> Result<Vec<u8>, GalleryError> {
        self.authorize(credential)?;
        self.validate(&request)?;

        let id = ImageId::from_str(identifier)
            .map_err(|_| GalleryError::Storage(StorageError::not_found(identifier)))?;
        let key = self.store.resolve(id).await?;

        debug!(image_id = %id, key = %key, "Resolved image");
        self.render(&key, request).await
    }

    /// Serve a uniformly chosen stored image as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential is rejected
    /// - A requested dimension exceeds the maximum
    /// - The store is empty
    /// - The chosen file cannot be read or decoded
    pub async fn random(
        &self,
        credential: Option<&str>,
        request: TransformRequest,
    ) -> Result<Vec<u8>, GalleryError> {
        self.authorize(credential)?;
        self.validate(&request)?;

        let entries = self.store.list_all().await?;
        let key = entries
            .choose(&mut rand::rng())
            .ok_or(GalleryError::EmptyStore)?;

        debug!(key = %key, candidates = entries.len(), "Picked random image");
        self.render(key, request).await
    }

    fn validate(&self, request: &TransformRequest) -> Result<(), GalleryError> {
        match request.largest_dimension() {
            Some(requested) if requested > self.max_dimension => Err(
                GalleryError::dimension_too_large(requested, self.max_dimension),
            ),
            _ => Ok(()),
        }
    }

    async fn render(&self, key: &str, request: TransformRequest) -> Result<Vec<u8>, GalleryError> {
        let data = self.store.read(key).await?;
        run_blocking(move || transform::transform(&data, &request)).await
    }
}

/// Run CPU-bound image work on the blocking pool.
async fn run_blocking<T, F>(f: F) -> Result<T, GalleryError>
where
    F: FnOnce() -> Result<T, TransformError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GalleryError::Task(e.to_string()))?
        .map_err(GalleryError::from)
}

fn image_url(base_url: &str, id: ImageId) -> String {
    if base_url.ends_with('/') {
        format!("{base_url}{id}")
    } else {
        format!("{base_url}/{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    use crate::storage::StorageConfig;

    const BASE_URL: &str = "http://localhost:5100/";

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 100, 50]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        encoded(width, height, ImageFormat::Png)
    }

    fn dimensions(data: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory(data).unwrap();
        (img.width(), img.height())
    }

    fn service(dir: &TempDir, gate: AccessGate) -> ImageService {
        ImageService::new(
            BlobStore::from_config(StorageConfig::new(dir.path())).unwrap(),
            gate,
        )
    }

    fn open_service(dir: &TempDir) -> ImageService {
        service(dir, AccessGate::open())
    }

    async fn upload_one(service: &ImageService, width: u32, height: u32) -> ImageId {
        let outcome = service
            .upload(None, vec![UploadFile::new("pic.png", png(width, height))], BASE_URL)
            .await
            .unwrap();
        outcome.uploaded[0].id
    }

    #[tokio::test]
    async fn test_upload_then_fetch_round_trip() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);

        let id = upload_one(&service, 64, 48).await;
        let out = service
            .fetch(None, &id.to_string(), TransformRequest::original())
            .await
            .unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        assert_eq!(dimensions(&out), (64, 48));
    }

    #[tokio::test]
    async fn test_upload_builds_urls() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);

        let outcome = service
            .upload(None, vec![UploadFile::new("a.png", png(4, 4))], "https://img.example.com")
            .await
            .unwrap();

        let uploaded = &outcome.uploaded[0];
        assert_eq!(uploaded.url, format!("https://img.example.com/{}", uploaded.id));
    }

    #[tokio::test]
    async fn test_upload_issues_unique_ids() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let files: Vec<_> = (0..25)
            .map(|i| UploadFile::new(format!("img{i}.png"), png(2, 2)))
            .collect();

        let outcome = service.upload(None, files, BASE_URL).await.unwrap();

        let ids: HashSet<_> = outcome.uploaded.iter().map(|u| u.id).collect();
        assert_eq!(ids.len(), 25);
        assert_eq!(service.store().list_all().await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn test_upload_keeps_source_format_and_extension() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);

        let outcome = service
            .upload(
                None,
                vec![UploadFile::new("Photo.JPG", encoded(30, 20, ImageFormat::Jpeg))],
                BASE_URL,
            )
            .await
            .unwrap();

        let id = outcome.uploaded[0].id;
        let key = service.store().resolve(id).await.unwrap();
        assert_eq!(key, format!("{id}.jpg"));

        let stored = std::fs::read(dir.path().join(&key)).unwrap();
        assert_eq!(image::guess_format(&stored).unwrap(), ImageFormat::Jpeg);
        assert_eq!(dimensions(&stored), (30, 20));
    }

    #[tokio::test]
    async fn test_upload_batch_isolates_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let files = vec![
            UploadFile::new("valid.png", png(10, 10)),
            UploadFile::new("corrupt.bin", b"not an image at all".to_vec()),
        ];

        let outcome = service.upload(None, files, BASE_URL).await.unwrap();

        assert_eq!(outcome.uploaded.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].filename, "corrupt.bin");
        assert!(outcome.failed[0].reason.contains("decode"));

        // The raw corrupt bytes remain stored.
        assert_eq!(service.store().list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_skips_unnamed_files() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let files = vec![
            UploadFile::new("", Vec::new()),
            UploadFile::new("kept.png", png(3, 3)),
        ];

        let outcome = service.upload(None, files, BASE_URL).await.unwrap();

        assert_eq!(outcome.uploaded.len(), 1);
        assert!(outcome.failed.is_empty());
        assert_eq!(service.store().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_only_unnamed_files_is_empty_success() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);

        let outcome = service
            .upload(None, vec![UploadFile::new("", Vec::new())], BASE_URL)
            .await
            .unwrap();

        assert!(outcome.uploaded.is_empty());
        assert!(service.store().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_without_files_is_rejected() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);

        let err = service.upload(None, Vec::new(), BASE_URL).await.unwrap_err();
        assert!(matches!(err, GalleryError::NoFiles));
    }

    #[tokio::test]
    async fn test_upload_storage_failure_aborts() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let staging = service.store().config().atomic_write_dir();
        if staging.exists() {
            std::fs::remove_dir_all(&staging).unwrap();
        }
        std::fs::write(&staging, b"not a directory").unwrap();

        let err = service
            .upload(None, vec![UploadFile::new("a.png", png(2, 2))], BASE_URL)
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Storage(StorageError::Operation(_))));
    }

    #[tokio::test]
    async fn test_fetch_exact_resize() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let id = upload_one(&service, 400, 300).await;

        let request = TransformRequest::new(Some(200), Some(100), false);
        let out = service.fetch(None, &id.to_string(), request).await.unwrap();
        assert_eq!(dimensions(&out), (200, 100));
    }

    #[tokio::test]
    async fn test_fetch_bounded_resize() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let id = upload_one(&service, 400, 100).await;

        let request = TransformRequest::new(Some(200), Some(200), true);
        let out = service.fetch(None, &id.to_string(), request).await.unwrap();
        assert_eq!(dimensions(&out), (200, 50));
    }

    #[tokio::test]
    async fn test_fetch_unknown_id() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        upload_one(&service, 2, 2).await;

        let err = service
            .fetch(None, &ImageId::new().to_string(), TransformRequest::original())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Storage(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_fetch_malformed_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let id = upload_one(&service, 2, 2).await;
        let prefix = &id.to_string()[..8];

        let err = service
            .fetch(None, prefix, TransformRequest::original())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Storage(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_fetch_corrupt_stored_file() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        let id = ImageId::new();
        service.store().put(id, ".png", b"garbage").await.unwrap();

        let err = service
            .fetch(None, &id.to_string(), TransformRequest::original())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Transform(TransformError::Decode(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_dimension() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir).with_max_dimension(500);
        let id = upload_one(&service, 2, 2).await;

        let request = TransformRequest::new(Some(501), None, false);
        let err = service.fetch(None, &id.to_string(), request).await.unwrap_err();
        assert!(matches!(
            err,
            GalleryError::DimensionTooLarge { requested: 501, max: 500 }
        ));
    }

    #[tokio::test]
    async fn test_random_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);

        let err = service
            .random(None, TransformRequest::original())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::EmptyStore));
    }

    #[tokio::test]
    async fn test_random_honors_resize() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        upload_one(&service, 400, 100).await;

        let request = TransformRequest::new(Some(200), Some(200), true);
        let out = service.random(None, request).await.unwrap();
        assert_eq!(dimensions(&out), (200, 50));
    }

    #[tokio::test]
    async fn test_random_reaches_every_image() {
        let dir = TempDir::new().unwrap();
        let service = open_service(&dir);
        for width in [11, 12, 13] {
            upload_one(&service, width, 5).await;
        }

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let out = service
                .random(None, TransformRequest::original())
                .await
                .unwrap();
            seen.insert(dimensions(&out).0);
        }
        assert_eq!(seen, HashSet::from([11, 12, 13]));
    }

    #[tokio::test]
    async fn test_gate_guards_every_pipeline() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, AccessGate::new(Some("s3cret".to_string())));
        let files = || vec![UploadFile::new("a.png", png(4, 4))];

        for credential in [None, Some("wrong")] {
            assert!(matches!(
                service.upload(credential, files(), BASE_URL).await,
                Err(GalleryError::Forbidden)
            ));
            assert!(matches!(
                service
                    .fetch(credential, &ImageId::new().to_string(), TransformRequest::original())
                    .await,
                Err(GalleryError::Forbidden)
            ));
            assert!(matches!(
                service.random(credential, TransformRequest::original()).await,
                Err(GalleryError::Forbidden)
            ));
        }
        assert!(service.store().is_empty().await.unwrap());

        let outcome = service
            .upload(Some("s3cret"), files(), BASE_URL)
            .await
            .unwrap();
        let id = outcome.uploaded[0].id.to_string();
        assert!(
            service
                .fetch(Some("s3cret"), &id, TransformRequest::original())
                .await
                .is_ok()
        );
        assert!(
            service
                .random(Some("s3cret"), TransformRequest::original())
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_image_url() {
        let id = ImageId::new();
        assert_eq!(image_url("http://h/", id), format!("http://h/{id}"));
        assert_eq!(image_url("http://h", id), format!("http://h/{id}"));
    }
}
