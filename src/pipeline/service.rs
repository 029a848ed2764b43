//! Deck service: archive in, presentation out.
//!
//! # Flow
//!
//! ```text
//!  archive bytes
//!       │
//!       ▼
//!  extract_images ──► natural_sort(names)
//!                          │
//!           ┌──────────────┘  for each name, in order
//!           ▼
//!     probe_image ──► layout(descriptor, sink.canvas(), policy)
//!                          │
//!                          ▼
//!              sink.add_slide() + sink.place_picture()
//!                          │
//!                          ▼
//!                 Presentation::to_bytes()
//! ```

use std::str::FromStr;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::archive::{extract_images, probe_image, ArchiveLimits, ExtractedImages};
use crate::deck::{DeckSink, PictureFile, Presentation, SlideSize};
use crate::error::BuildError;
use crate::layout::{layout, natural_sort, FitPolicy};

/// Default slide width in pixels.
pub const DEFAULT_SLIDE_WIDTH_PX: u32 = 1920;

/// Default slide height in pixels.
pub const DEFAULT_SLIDE_HEIGHT_PX: u32 = 1080;

// =============================================================================
// Options
// =============================================================================

/// Per-request deck settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckOptions {
    /// Slide width in pixels (converted at 96 DPI)
    pub slide_width_px: u32,

    /// Slide height in pixels (converted at 96 DPI)
    pub slide_height_px: u32,

    /// How each image is fitted onto its slide
    pub fit_policy: FitPolicy,
}

impl DeckOptions {
    pub fn slide_size(&self) -> SlideSize {
        SlideSize::new(self.slide_width_px, self.slide_height_px)
    }
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            slide_width_px: DEFAULT_SLIDE_WIDTH_PX,
            slide_height_px: DEFAULT_SLIDE_HEIGHT_PX,
            fit_policy: FitPolicy::FitWidth,
        }
    }
}

/// What to do when a single image cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageErrorPolicy {
    /// Log the failure, leave the image out and keep going
    #[default]
    Skip,

    /// Fail the whole build with the first image error
    Abort,
}

impl ImageErrorPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ImageErrorPolicy::Skip => "skip",
            ImageErrorPolicy::Abort => "abort",
        }
    }
}

impl FromStr for ImageErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(ImageErrorPolicy::Skip),
            "abort" => Ok(ImageErrorPolicy::Abort),
            other => Err(format!(
                "unknown image error policy '{}' (expected 'skip' or 'abort')",
                other
            )),
        }
    }
}

impl std::fmt::Display for ImageErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Output
// =============================================================================

/// An image that was left out of the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    /// Archive entry name
    pub name: String,

    /// Why it was skipped
    pub reason: String,
}

/// A finished presentation.
#[derive(Debug, Clone)]
pub struct DeckOutput {
    /// The serialized `.pptx` document
    pub document: Bytes,

    /// Number of slides in the document
    pub slide_count: usize,

    /// Images that could not be placed, in presentation order
    pub skipped: Vec<SkippedImage>,
}

/// Result of feeding images into a [`DeckSink`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Entry names that received a slide, in slide order
    pub placed: Vec<String>,

    /// Entries that were skipped
    pub skipped: Vec<SkippedImage>,
}

// =============================================================================
// Deck Service
// =============================================================================

/// Builds presentations from image archives.
///
/// The service only holds immutable settings. Every build extracts into its
/// own scratch directory, so one service can be shared across concurrent
/// requests.
///
/// # Example
///
/// ```ignore
/// use deck_builder::pipeline::{DeckOptions, DeckService};
///
/// let service = DeckService::new();
/// let output = service.build(&archive_bytes, &DeckOptions::default())?;
/// std::fs::write("deck.pptx", &output.document)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeckService {
    limits: ArchiveLimits,
    on_image_error: ImageErrorPolicy,
}

impl DeckService {
    /// Create a service with default limits that skips unreadable images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the archive extraction limits.
    pub fn with_limits(mut self, limits: ArchiveLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set how per-image failures are handled.
    pub fn with_image_error_policy(mut self, policy: ImageErrorPolicy) -> Self {
        self.on_image_error = policy;
        self
    }

    pub fn limits(&self) -> &ArchiveLimits {
        &self.limits
    }

    pub fn image_error_policy(&self) -> ImageErrorPolicy {
        self.on_image_error
    }

    /// Build a presentation from the ZIP archive in `archive`.
    ///
    /// Images become slides in natural filename order. This call performs
    /// blocking file I/O; from async code use [`spawn_build`](Self::spawn_build).
    ///
    /// # Errors
    ///
    /// - [`BuildError::Deck`] if the slide size is outside the format's limits
    /// - [`BuildError::Archive`] if the archive is unreadable or too large
    /// - [`BuildError::NoImages`] if no image ended up on a slide
    /// - a per-image error if the policy is [`ImageErrorPolicy::Abort`]
    pub fn build(&self, archive: &[u8], options: &DeckOptions) -> Result<DeckOutput, BuildError> {
        let mut presentation = Presentation::new(options.slide_size())?;
        let images = extract_images(archive, &self.limits)?;

        debug!(
            images = images.len(),
            fit_mode = %options.fit_policy,
            width_px = options.slide_width_px,
            height_px = options.slide_height_px,
            "Building deck"
        );

        let report = self.place_images(&images, options.fit_policy, &mut presentation)?;
        if report.placed.is_empty() {
            return Err(BuildError::NoImages);
        }

        let document = presentation.to_bytes()?;

        info!(
            slides = presentation.slide_count(),
            skipped = report.skipped.len(),
            bytes = document.len(),
            "Built presentation"
        );

        Ok(DeckOutput {
            document,
            slide_count: presentation.slide_count(),
            skipped: report.skipped,
        })
    }

    /// Run [`build`](Self::build) on the blocking thread pool.
    pub async fn spawn_build(
        self: Arc<Self>,
        archive: Bytes,
        options: DeckOptions,
    ) -> Result<DeckOutput, BuildError> {
        tokio::task::spawn_blocking(move || self.build(&archive, &options))
            .await
            .map_err(|e| BuildError::Task(e.to_string()))?
    }

    /// Lay out every extracted image in natural order and hand it to `sink`.
    ///
    /// A slide whose picture fails is discarded again, so the sink never
    /// keeps a blank slide for a skipped image.
    pub fn place_images<S: DeckSink>(
        &self,
        images: &ExtractedImages,
        policy: FitPolicy,
        sink: &mut S,
    ) -> Result<PlacementReport, BuildError> {
        let mut report = PlacementReport::default();

        for name in natural_sort(images.names()) {
            match place_one(images, &name, policy, sink) {
                Ok(()) => report.placed.push(name),
                Err(err) if err.is_per_image() && self.on_image_error == ImageErrorPolicy::Skip => {
                    warn!(image = %name, error = %err, "Skipping image");
                    report.skipped.push(SkippedImage {
                        name,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(report)
    }
}

/// Probe, lay out and place a single image.
fn place_one<S: DeckSink>(
    images: &ExtractedImages,
    name: &str,
    policy: FitPolicy,
    sink: &mut S,
) -> Result<(), BuildError> {
    let path = images.locate(name)?;

    let probed = probe_image(name, path)?;

    let placement =
        layout(probed.descriptor, sink.canvas(), policy).map_err(|source| BuildError::Layout {
            file: name.to_string(),
            source,
        })?;

    let file = PictureFile {
        name: name.to_string(),
        path: path.to_path_buf(),
        format: probed.format,
    };

    sink.add_slide();
    if let Err(err) = sink.place_picture(&file, placement) {
        sink.discard_slide();
        return Err(err.into());
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
