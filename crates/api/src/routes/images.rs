//! Image upload and retrieval routes.

use axum::{
    Json, Router,
    extract::{
        Multipart, Path, Query, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::QueryRejection,
    },
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pixy_core::gallery::{UploadFile, UploadOutcome};
use pixy_core::transform::{OUTPUT_CONTENT_TYPE, TransformRequest};
use pixy_shared::{AppError, ImageId};
use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiKey, BaseUrl};

/// Multipart field holding the uploaded files.
const IMAGES_FIELD: &str = "images";

/// Creates the image routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload-image", post(upload_images))
        .route("/random", get(random_image))
        .route("/{image_id}", get(get_image))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Resize parameters accepted by the retrieval routes.
#[derive(Debug, Default, Deserialize)]
pub struct TransformQuery {
    /// Target width. Empty or unparsable means absent.
    #[serde(default, deserialize_with = "deserialize_dimension")]
    pub w: Option<u32>,
    /// Target height. Empty or unparsable means absent.
    #[serde(default, deserialize_with = "deserialize_dimension")]
    pub h: Option<u32>,
    /// Fit inside `w`×`h` instead of stretching to it.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub maintain_aspect_ratio: bool,
}

impl From<TransformQuery> for TransformRequest {
    fn from(query: TransformQuery) -> Self {
        Self::new(query.w, query.h, query.maintain_aspect_ratio)
    }
}

/// Response for a batch upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Stored images.
    pub images: Vec<UploadedImageResponse>,
    /// Files that were not valid images.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedUploadResponse>,
}

/// A stored image.
#[derive(Debug, Serialize)]
pub struct UploadedImageResponse {
    /// Issued identifier.
    pub image_id: ImageId,
    /// Link to the image.
    pub url: String,
}

/// A rejected file.
#[derive(Debug, Serialize)]
pub struct FailedUploadResponse {
    /// Client-supplied file name.
    pub filename: String,
    /// Why the file was rejected.
    pub reason: String,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            images: outcome
                .uploaded
                .into_iter()
                .map(|u| UploadedImageResponse {
                    image_id: u.id,
                    url: u.url,
                })
                .collect(),
            failed: outcome
                .failed
                .into_iter()
                .map(|f| FailedUploadResponse {
                    filename: f.filename,
                    reason: f.reason,
                })
                .collect(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a query flag. Empty means false.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "off" => Some(false),
        "true" | "1" | "yes" | "on" => Some(true),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(false);
    };
    parse_flag(&raw).ok_or_else(|| de::Error::custom(format!("invalid boolean: {raw:?}")))
}

fn deserialize_dimension<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| raw.trim().parse().ok()))
}

fn multipart_error(err: &MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        AppError::BadRequest(err.body_text()).into()
    }
}

/// Collect every file in the `images` field. Other fields are ignored.
///
/// Returns `BadRequest` when the field is absent.
async fn read_images(multipart: &mut Multipart) -> Result<Vec<UploadFile>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
        files.push(UploadFile::new(filename, bytes));
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()).into());
    }
    Ok(files)
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, OUTPUT_CONTENT_TYPE)], bytes).into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/upload-image`
/// Store one or more images from the `images` multipart field.
async fn upload_images(
    State(state): State<AppState>,
    api_key: ApiKey,
    BaseUrl(base_url): BaseUrl,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    // Reject before buffering the body.
    state.images.authorize(api_key.as_deref())?;

    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let files = read_images(&mut multipart).await?;
    let received = files.len();

    let outcome = state
        .images
        .upload(api_key.as_deref(), files, &base_url)
        .await?;

    info!(
        received,
        stored = outcome.uploaded.len(),
        failed = outcome.failed.len(),
        "Upload processed"
    );

    Ok(Json(outcome.into()))
}

/// GET `/{image_id}`
/// Serve a stored image as PNG, optionally resized.
async fn get_image(
    State(state): State<AppState>,
    api_key: ApiKey,
    Path(image_id): Path<String>,
    query: Result<Query<TransformQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    state.images.authorize(api_key.as_deref())?;
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let bytes = state
        .images
        .fetch(api_key.as_deref(), &image_id, query.into())
        .await?;

    Ok(png_response(bytes))
}

/// GET `/random`
/// Serve a uniformly chosen image as PNG, optionally resized.
async fn random_image(
    State(state): State<AppState>,
    api_key: ApiKey,
    query: Result<Query<TransformQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    state.images.authorize(api_key.as_deref())?;
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let bytes = state
        .images
        .random(api_key.as_deref(), query.into())
        .await?;

    Ok(png_response(bytes))
}
