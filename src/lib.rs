//! # Deck Builder
//!
//! Turns a ZIP archive of images into a PowerPoint presentation with one
//! slide per image.
//!
//! Images are ordered naturally by file name (`slide2.png` before
//! `slide10.png`) and each one is scaled and centered on its slide according
//! to a [`FitPolicy`].
//!
//! ## Features
//!
//! - **Layout engine**: pure, deterministic placement for fit-width, fit-height, fill and letterbox
//! - **Natural ordering**: numeric runs in file names compare by value, text case-insensitively
//! - **Self-contained output**: writes `.pptx` packages directly, no office suite required
//! - **Safe extraction**: per-request scratch directories, path and size limits
//! - **Web form and CLI**: upload through the browser or build from the command line
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`layout`] - Slide layout engine and natural-order sequencer
//! - [`archive`] - ZIP extraction and image header probing
//! - [`deck`] - Presentation model and `.pptx` writer
//! - [`pipeline`] - Orchestration from archive bytes to document bytes
//! - [`server`] - Axum-based HTTP server and upload form
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use deck_builder::{DeckOptions, DeckService, FitPolicy};
//!
//! let archive = std::fs::read("images.zip").unwrap();
//! let options = DeckOptions {
//!     slide_width_px: 1024,
//!     slide_height_px: 768,
//!     fit_policy: FitPolicy::from_name("fit_height"),
//! };
//!
//! let output = DeckService::new().build(&archive, &options).unwrap();
//! std::fs::write("presentation.pptx", &output.document).unwrap();
//! println!("{} slides", output.slide_count);
//! ```

pub mod archive;
pub mod config;
pub mod deck;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use archive::{
    extract_images, is_image_name, probe_image, ArchiveLimits, ExtractedImages, ProbedImage,
};
pub use config::{BuildConfig, Cli, Command, DeckArgs, ServeConfig};
pub use deck::{
    DeckSink, PictureFile, PictureFormat, Presentation, SlideSize, PPTX_CONTENT_TYPE,
};
pub use error::{ArchiveError, BuildError, DeckError, LayoutError};
pub use layout::{
    layout, natural_cmp, natural_sort, CanvasSize, FitPolicy, ImageDescriptor, NaturalKey,
    Placement,
};
pub use pipeline::{DeckOptions, DeckOutput, DeckService, ImageErrorPolicy, SkippedImage};
pub use server::{create_router, AppState, ErrorResponse, HealthResponse, RouterConfig};
