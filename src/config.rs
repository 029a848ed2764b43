//! Configuration management for the deck builder.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `DECK_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use deck_builder::config::{Cli, Command};
//!
//! match Cli::parse().into_command() {
//!     Command::Serve(config) => println!("Listening on {}", config.bind_address()),
//!     Command::Build(config) => println!("Reading {}", config.input.display()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `DECK_HOST` - Server bind address (default: 0.0.0.0)
//! - `DECK_PORT` - Server port (default: 8080)
//! - `DECK_SLIDE_WIDTH` - Slide width in pixels (default: 1920)
//! - `DECK_SLIDE_HEIGHT` - Slide height in pixels (default: 1080)
//! - `DECK_FIT_MODE` - Fit mode (default: fit_width)
//! - `DECK_ON_IMAGE_ERROR` - `skip` or `abort` (default: skip)
//! - `DECK_MAX_UPLOAD_BYTES` - Maximum request body size (default: 256 MiB)
//! - `DECK_MAX_ENTRIES` - Maximum entries per archive (default: 10000)
//! - `DECK_MAX_EXTRACTED_BYTES` - Maximum extracted image bytes (default: 1 GiB)
//! - `DECK_CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::archive::{ArchiveLimits, DEFAULT_MAX_ENTRIES, DEFAULT_MAX_EXTRACTED_BYTES};
use crate::layout::FitPolicy;
use crate::pipeline::{
    DeckOptions, ImageErrorPolicy, DEFAULT_SLIDE_HEIGHT_PX, DEFAULT_SLIDE_WIDTH_PX,
};
use crate::server::DEFAULT_MAX_UPLOAD_BYTES;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default fit mode name.
pub const DEFAULT_FIT_MODE: &str = "fit_width";

/// Default output path for the `build` command.
pub const DEFAULT_OUTPUT: &str = "presentation.pptx";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Deck Builder - turn a ZIP archive of images into a slide deck.
///
/// Every PNG or JPEG in the archive becomes one slide, in natural filename
/// order, scaled and centered according to the chosen fit mode.
#[derive(Parser, Debug, Clone)]
#[command(name = "deck-builder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed arguments and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server with the upload form.
    Serve(ServeConfig),

    /// Build a presentation from a local archive.
    Build(BuildConfig),
}

// =============================================================================
// Deck Settings (shared)
// =============================================================================

/// Slide and archive settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct DeckArgs {
    /// Slide width in pixels (96 DPI).
    #[arg(long = "width", default_value_t = DEFAULT_SLIDE_WIDTH_PX, env = "DECK_SLIDE_WIDTH")]
    pub slide_width_px: u32,

    /// Slide height in pixels (96 DPI).
    #[arg(long = "height", default_value_t = DEFAULT_SLIDE_HEIGHT_PX, env = "DECK_SLIDE_HEIGHT")]
    pub slide_height_px: u32,

    /// Fit mode: fit_width, fit_height, fill or letterbox.
    ///
    /// Any other value is treated as letterbox.
    #[arg(long, default_value = DEFAULT_FIT_MODE, env = "DECK_FIT_MODE")]
    pub fit_mode: String,

    /// What to do with an image that cannot be read: skip or abort.
    #[arg(long, default_value = "skip", env = "DECK_ON_IMAGE_ERROR")]
    pub on_image_error: ImageErrorPolicy,

    /// Maximum number of entries in an archive.
    #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES, env = "DECK_MAX_ENTRIES")]
    pub max_entries: usize,

    /// Maximum total bytes of images extracted from an archive.
    #[arg(long, default_value_t = DEFAULT_MAX_EXTRACTED_BYTES, env = "DECK_MAX_EXTRACTED_BYTES")]
    pub max_extracted_bytes: u64,
}

impl DeckArgs {
    /// Validate the settings and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.deck_options()
            .slide_size()
            .validate()
            .map_err(|e| e.to_string())?;

        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }
        if self.max_extracted_bytes == 0 {
            return Err("max_extracted_bytes must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Deck options built from these settings.
    pub fn deck_options(&self) -> DeckOptions {
        DeckOptions {
            slide_width_px: self.slide_width_px,
            slide_height_px: self.slide_height_px,
            fit_policy: FitPolicy::from_name(&self.fit_mode),
        }
    }

    /// Archive limits built from these settings.
    pub fn archive_limits(&self) -> ArchiveLimits {
        ArchiveLimits {
            max_entries: self.max_entries,
            max_extracted_bytes: self.max_extracted_bytes,
        }
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Configuration for the `serve` command.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "DECK_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "DECK_PORT")]
    pub port: u16,

    #[command(flatten)]
    pub deck: DeckArgs,

    /// Maximum accepted request body in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "DECK_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "DECK_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("host must not be empty".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        self.deck.validate()
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Build Command
// =============================================================================

/// Configuration for the `build` command.
#[derive(Args, Debug, Clone)]
pub struct BuildConfig {
    /// ZIP archive of PNG/JPEG images.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the presentation.
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    #[command(flatten)]
    pub deck: DeckArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl BuildConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("input path is required".to_string());
        }
        if self.output.as_os_str().is_empty() {
            return Err("output path must not be empty".to_string());
        }
        if self.input == self.output {
            return Err("input and output must be different files".to_string());
        }

        self.deck.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
