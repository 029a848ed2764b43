//! HTTP request handlers for the deck builder.
//!
//! # Endpoints
//!
//! - `GET /` - Upload form
//! - `POST /` - Build a presentation from an uploaded ZIP archive
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::deck::PPTX_CONTENT_TYPE;
use crate::error::{ArchiveError, BuildError, DeckError, LayoutError};
use crate::layout::FitPolicy;
use crate::pipeline::{DeckOptions, DeckService};

use super::form::render_upload_form;

/// Multipart field carrying the ZIP archive.
pub const FIELD_ARCHIVE: &str = "images_zip";

/// Multipart field with the slide width in pixels.
pub const FIELD_SLIDE_WIDTH: &str = "slide_width_px";

/// Multipart field with the slide height in pixels.
pub const FIELD_SLIDE_HEIGHT: &str = "slide_height_px";

/// Multipart field with the fit policy name.
pub const FIELD_FIT_MODE: &str = "fit_mode";

/// Disposition of the returned document.
pub const CONTENT_DISPOSITION: &str = r#"attachment; filename="presentation.pptx""#;

/// Response header with the number of slides in the document.
pub const SLIDE_COUNT_HEADER: &str = "x-slide-count";

/// Response header with the number of images left out of the document.
pub const SKIPPED_IMAGES_HEADER: &str = "x-skipped-images";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the deck service.
///
/// This is passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The service that turns archives into presentations
    pub deck_service: Arc<DeckService>,

    /// Settings used when the form leaves a field out
    pub defaults: DeckOptions,
}

impl AppState {
    /// Create a new application state with default deck options.
    pub fn new(deck_service: DeckService) -> Self {
        Self {
            deck_service: Arc::new(deck_service),
            defaults: DeckOptions::default(),
        }
    }

    /// Set the options used for fields missing from an upload.
    pub fn with_defaults(mut self, defaults: DeckOptions) -> Self {
        self.defaults = defaults;
        self
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "no_images", "invalid_upload")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Errors returned by the upload handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request has no usable archive file
    InvalidUpload(String),

    /// A form field could not be parsed
    InvalidRequest(String),

    /// The multipart body itself could not be read
    Multipart(MultipartError),

    /// The build pipeline failed
    Build(BuildError),
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        ApiError::Build(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

/// Status code, error type and message for a build failure.
fn classify_build_error(err: &BuildError) -> (StatusCode, &'static str, String) {
    match err {
        BuildError::Archive(ArchiveError::InvalidArchive(_)) => {
            (StatusCode::BAD_REQUEST, "invalid_archive", err.to_string())
        }
        BuildError::Archive(ArchiveError::TooLarge { .. }) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "archive_too_large",
            err.to_string(),
        ),
        BuildError::Archive(ArchiveError::Image { .. })
        | BuildError::Deck(DeckError::Picture { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "image_error",
            err.to_string(),
        ),
        BuildError::Archive(ArchiveError::Io(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "io_error",
            err.to_string(),
        ),
        BuildError::Layout {
            source: LayoutError::InvalidDimensions { .. },
            ..
        } => (StatusCode::BAD_REQUEST, "invalid_dimensions", err.to_string()),
        BuildError::Deck(DeckError::InvalidSlideSize { .. }) => (
            StatusCode::BAD_REQUEST,
            "invalid_slide_size",
            err.to_string(),
        ),
        BuildError::NoImages => (
            StatusCode::BAD_REQUEST,
            "no_images",
            "No valid images found.".to_string(),
        ),
        BuildError::Deck(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "document_error",
            err.to_string(),
        ),
        BuildError::Task(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            err.to_string(),
        ),
    }
}

/// Convert ApiError to HTTP response.
///
/// This implementation logs errors appropriately based on their severity:
/// - 4xx errors are logged at WARN level (client errors)
/// - 5xx errors are logged at ERROR level (server errors)
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::InvalidUpload(message) => {
                (StatusCode::BAD_REQUEST, "invalid_upload", message.clone())
            }
            ApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, "invalid_request", message.clone())
            }
            ApiError::Multipart(err) => {
                let status = err.status();
                let error_type = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "upload_too_large"
                } else {
                    "invalid_upload"
                };
                (status, error_type, err.body_text())
            }
            ApiError::Build(err) => classify_build_error(err),
        };

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status.is_client_error() {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Upload Parsing
// =============================================================================

/// Archive and options read from a multipart upload.
#[derive(Debug)]
struct Upload {
    archive: Bytes,
    options: DeckOptions,
}

/// Whether an uploaded file name looks like a ZIP archive.
pub fn is_zip_filename(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".zip")
}

/// Parse a pixel size field; blank values fall back to `default`.
fn parse_pixels(field: &str, value: &str, default: u32) -> Result<u32, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }

    value.parse().map_err(|_| {
        ApiError::InvalidRequest(format!(
            "Invalid {}: '{}' (expected a whole number of pixels)",
            field, value
        ))
    })
}

/// Read every field of the upload form.
///
/// Unknown fields are ignored. Missing size and fit fields take their value
/// from `defaults`.
async fn read_upload(mut multipart: Multipart, defaults: &DeckOptions) -> Result<Upload, ApiError> {
    let mut archive = None;
    let mut options = *defaults;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            FIELD_ARCHIVE => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    return Err(ApiError::InvalidUpload("No file uploaded".to_string()));
                }
                if !is_zip_filename(&file_name) {
                    return Err(ApiError::InvalidUpload(format!(
                        "Uploaded file must be a .zip archive, got '{}'",
                        file_name
                    )));
                }
                archive = Some(field.bytes().await?);
            }
            FIELD_SLIDE_WIDTH => {
                let text = field.text().await?;
                options.slide_width_px = parse_pixels(FIELD_SLIDE_WIDTH, &text, defaults.slide_width_px)?;
            }
            FIELD_SLIDE_HEIGHT => {
                let text = field.text().await?;
                options.slide_height_px =
                    parse_pixels(FIELD_SLIDE_HEIGHT, &text, defaults.slide_height_px)?;
            }
            FIELD_FIT_MODE => {
                options.fit_policy = FitPolicy::from_name(&field.text().await?);
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let archive =
        archive.ok_or_else(|| ApiError::InvalidUpload("No file uploaded".to_string()))?;

    Ok(Upload { archive, options })
}

// =============================================================================
// Handlers
// =============================================================================

/// Serve the upload form.
///
/// # Endpoint
///
/// `GET /`
pub async fn form_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_upload_form(&state.defaults))
}

/// Build a presentation from an uploaded archive.
///
/// # Endpoint
///
/// `POST /` with `multipart/form-data`
///
/// # Form Fields
///
/// - `images_zip`: ZIP archive of `.png`, `.jpg` or `.jpeg` files (required)
/// - `slide_width_px`: Slide width in pixels (default: 1920)
/// - `slide_height_px`: Slide height in pixels (default: 1080)
/// - `fit_mode`: `fit_width`, `fit_height`, `fill` or `letterbox`; anything
///   else is treated as `letterbox` (default: `fit_width`)
///
/// # Response
///
/// - `200 OK`: the `.pptx` document as an attachment named `presentation.pptx`
/// - `400 Bad Request`: missing or non-ZIP upload, bad fields, no images
/// - `413 Payload Too Large`: upload or extracted archive over the limits
/// - `422 Unprocessable Entity`: an image failed while skipping is disabled
/// - `500 Internal Server Error`: processing error
///
/// # Headers
///
/// - `Content-Disposition: attachment; filename="presentation.pptx"`
/// - `X-Slide-Count`: number of slides
/// - `X-Skipped-Images`: number of images left out
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart, &state.defaults).await?;

    debug!(
        bytes = upload.archive.len(),
        fit_mode = %upload.options.fit_policy,
        "Received archive upload"
    );

    let output = Arc::clone(&state.deck_service)
        .spawn_build(upload.archive, upload.options)
        .await?;

    info!(
        slides = output.slide_count,
        skipped = output.skipped.len(),
        bytes = output.document.len(),
        "Sending presentation"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PPTX_CONTENT_TYPE),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static(CONTENT_DISPOSITION),
    );
    headers.insert(
        HeaderName::from_static(SLIDE_COUNT_HEADER),
        HeaderValue::from(output.slide_count),
    );
    headers.insert(
        HeaderName::from_static(SKIPPED_IMAGES_HEADER),
        HeaderValue::from(output.skipped.len()),
    );

    Ok((StatusCode::OK, headers, Body::from(output.document)).into_response())
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
