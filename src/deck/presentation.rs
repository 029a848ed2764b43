//! In-memory presentation model and the document sink the pipeline writes to.

use std::fs;
use std::path::PathBuf;

use bytes::Bytes;

use crate::error::DeckError;
use crate::layout::{CanvasSize, Placement};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// English Metric Units per pixel at 96 DPI.
pub const EMU_PER_PIXEL: i64 = EMU_PER_INCH / 96;

/// Smallest slide side the format accepts (1 inch).
pub const MIN_SLIDE_EMU: i64 = 914_400;

/// Largest slide side the format accepts (56 inches).
pub const MAX_SLIDE_EMU: i64 = 51_206_400;

/// Document MIME type for `.pptx` files.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Convert pixels to EMUs at 96 DPI.
#[inline]
pub fn px_to_emu(px: u32) -> i64 {
    i64::from(px) * EMU_PER_PIXEL
}

// =============================================================================
// Picture Format
// =============================================================================

/// Image encodings that can be embedded in a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PictureFormat {
    Png,
    Jpeg,
}

impl PictureFormat {
    /// Extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type registered for the extension.
    pub fn content_type(&self) -> &'static str {
        match self {
            PictureFormat::Png => "image/png",
            PictureFormat::Jpeg => "image/jpeg",
        }
    }
}

// =============================================================================
// Slide Size
// =============================================================================

/// Slide dimensions as requested in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub width_px: u32,
    pub height_px: u32,
}

impl SlideSize {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Width in EMUs.
    pub fn width_emu(&self) -> i64 {
        px_to_emu(self.width_px)
    }

    /// Height in EMUs.
    pub fn height_emu(&self) -> i64 {
        px_to_emu(self.height_px)
    }

    /// Check both sides against the format's limits.
    pub fn validate(&self) -> Result<(), DeckError> {
        let in_range = |emu: i64| (MIN_SLIDE_EMU..=MAX_SLIDE_EMU).contains(&emu);
        if in_range(self.width_emu()) && in_range(self.height_emu()) {
            Ok(())
        } else {
            Err(DeckError::InvalidSlideSize {
                width_px: self.width_px,
                height_px: self.height_px,
                min_px: (MIN_SLIDE_EMU / EMU_PER_PIXEL) as u32,
                max_px: (MAX_SLIDE_EMU / EMU_PER_PIXEL) as u32,
            })
        }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

// =============================================================================
// Document Sink
// =============================================================================

/// An image file ready to be placed on a slide.
#[derive(Debug, Clone)]
pub struct PictureFile {
    /// Name shown as the picture's description (usually the archive entry name)
    pub name: String,

    /// Location of the image data on disk
    pub path: PathBuf,

    /// Detected encoding
    pub format: PictureFormat,
}

/// Receiver for slides and pictures, in presentation order.
pub trait DeckSink {
    /// Canvas that placements for this sink are computed against.
    fn canvas(&self) -> CanvasSize;

    /// Append a blank slide and return its zero-based index.
    fn add_slide(&mut self) -> usize;

    /// Place a picture on the most recently added slide.
    fn place_picture(&mut self, file: &PictureFile, placement: Placement) -> Result<(), DeckError>;

    /// Drop the most recently added slide.
    fn discard_slide(&mut self);
}

// =============================================================================
// Presentation Model
// =============================================================================

/// Where the encoded bytes of a picture come from.
#[derive(Debug, Clone)]
pub enum PictureData {
    /// Already loaded into memory
    Memory(Bytes),

    /// Streamed from disk when the package is written
    File(PathBuf),
}

impl From<Bytes> for PictureData {
    fn from(data: Bytes) -> Self {
        PictureData::Memory(data)
    }
}

impl From<PathBuf> for PictureData {
    fn from(path: PathBuf) -> Self {
        PictureData::File(path)
    }
}

/// A picture embedded in a slide, positioned in EMUs.
#[derive(Debug, Clone)]
pub struct Picture {
    pub name: String,
    pub data: PictureData,
    pub format: PictureFormat,
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// A blank slide holding zero or more pictures.
#[derive(Debug, Clone, Default)]
pub struct Slide {
    pub pictures: Vec<Picture>,
}

/// A presentation with a fixed slide size.
///
/// Layout for this presentation runs in EMU space: use [`canvas`](Self::canvas)
/// as the layout canvas and pass the resulting placements to
/// [`place_picture`](DeckSink::place_picture).
#[derive(Debug, Clone)]
pub struct Presentation {
    size: SlideSize,
    pub(crate) slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation, rejecting sizes the format cannot hold.
    pub fn new(size: SlideSize) -> Result<Self, DeckError> {
        size.validate()?;
        Ok(Self {
            size,
            slides: Vec::new(),
        })
    }

    /// Requested slide size.
    pub fn size(&self) -> SlideSize {
        self.size
    }

    /// Slide width in EMUs.
    pub fn slide_width(&self) -> i64 {
        self.size.width_emu()
    }

    /// Slide height in EMUs.
    pub fn slide_height(&self) -> i64 {
        self.size.height_emu()
    }

    /// Layout canvas in EMUs.
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.slide_width() as f64, self.slide_height() as f64)
    }

    /// Number of slides added so far.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Remove the last slide, e.g. when its picture could not be placed.
    pub fn pop_slide(&mut self) -> Option<Slide> {
        self.slides.pop()
    }

    /// Add a picture to the last slide.
    ///
    /// File-backed data is only read by [`to_bytes`](Self::to_bytes), so the
    /// file must still exist at that point.
    pub fn push_picture(
        &mut self,
        name: impl Into<String>,
        data: impl Into<PictureData>,
        format: PictureFormat,
        placement: Placement,
    ) -> Result<(), DeckError> {
        let name = name.into();
        let (slide_width, slide_height) = (self.slide_width(), self.slide_height());

        let Some(slide) = self.slides.last_mut() else {
            return Err(DeckError::NoSlide { file: name });
        };

        // Rounding each value separately can push an edge one EMU past the slide.
        let width = to_emu(placement.width).min(slide_width);
        let height = to_emu(placement.height).min(slide_height);
        let left = to_emu(placement.left).min(slide_width - width);
        let top = to_emu(placement.top).min(slide_height - height);

        slide.pictures.push(Picture {
            name,
            data: data.into(),
            format,
            left,
            top,
            width,
            height,
        });
        Ok(())
    }
}

impl DeckSink for Presentation {
    fn canvas(&self) -> CanvasSize {
        Presentation::canvas(self)
    }

    fn add_slide(&mut self) -> usize {
        self.slides.push(Slide::default());
        self.slides.len() - 1
    }

    fn place_picture(
        &mut self,
        file: &PictureFile,
        placement: Placement,
    ) -> Result<(), DeckError> {
        let metadata = fs::metadata(&file.path).map_err(|e| DeckError::Picture {
            file: file.name.clone(),
            message: e.to_string(),
        })?;
        if !metadata.is_file() {
            return Err(DeckError::Picture {
                file: file.name.clone(),
                message: "not a regular file".to_string(),
            });
        }

        self.push_picture(file.name.clone(), file.path.clone(), file.format, placement)
    }

    fn discard_slide(&mut self) {
        self.pop_slide();
    }
}

/// Round a layout value to a whole, non-negative EMU count.
fn to_emu(value: f64) -> i64 {
    value.round().max(0.0) as i64
}

// =============================================================================
// Tests
// =============================================================================
