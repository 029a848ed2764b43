//! HTTP server layer for the deck builder.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │              GET /   POST /   GET /health                       │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    form     │  │        routes           │  │
//! │  │ (requests)  │  │ (upload UI) │  │  (router config)        │  │
//! │  └──────┬──────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────┼───────────────────────────────────────────────────────┘
//!           │ spawn_blocking
//!           ▼
//!     DeckService::build
//! ```

pub mod form;
pub mod handlers;
pub mod routes;

pub use form::render_upload_form;
pub use handlers::{
    form_handler, health_handler, is_zip_filename, upload_handler, ApiError, AppState,
    ErrorResponse, HealthResponse, CONTENT_DISPOSITION, FIELD_ARCHIVE, FIELD_FIT_MODE,
    FIELD_SLIDE_HEIGHT, FIELD_SLIDE_WIDTH, SKIPPED_IMAGES_HEADER, SLIDE_COUNT_HEADER,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_UPLOAD_BYTES};
