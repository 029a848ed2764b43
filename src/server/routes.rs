//! Router configuration for the deck builder.
//!
//! # Route Structure
//!
//! ```text
//! GET  /         - Upload form
//! POST /         - Archive upload, returns the presentation
//! GET  /health   - Health check
//! ```
//!
//! # Example
//!
//! ```ignore
//! use deck_builder::pipeline::DeckService;
//! use deck_builder::server::{create_router, RouterConfig};
//!
//! let config = RouterConfig::new()
//!     .with_max_upload_bytes(50 * 1024 * 1024)
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(DeckService::new(), config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use http::header::CONTENT_TYPE;
use http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    form_handler, health_handler, upload_handler, AppState, SKIPPED_IMAGES_HEADER,
    SLIDE_COUNT_HEADER,
};
use crate::pipeline::{DeckOptions, DeckService};

/// Default maximum request body size (256 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,

    /// Options applied when an upload leaves a field out
    pub defaults: DeckOptions,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Uploads up to 256 MiB are accepted
    /// - Missing form fields use 1920x1080 and `fit_width`
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            defaults: DeckOptions::default(),
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the maximum request body size in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Set the options used for fields missing from an upload.
    pub fn with_defaults(mut self, defaults: DeckOptions) -> Self {
        self.defaults = defaults;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// This function builds the complete Axum router with:
/// - The upload form and upload endpoint on `/`
/// - The health check on `/health`
/// - A request body limit
/// - CORS configuration
/// - Request tracing (optional)
pub fn create_router(deck_service: DeckService, config: RouterConfig) -> Router {
    let app_state = AppState::new(deck_service).with_defaults(config.defaults);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(form_handler).post(upload_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([
            HeaderName::from_static(SLIDE_COUNT_HEADER),
            HeaderName::from_static(SKIPPED_IMAGES_HEADER),
        ])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => {
            // No origins allowed - this effectively disables CORS
            cors
        }
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
