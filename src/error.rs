use thiserror::Error;

/// Errors raised by the slide layout engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// Image or canvas has a zero, negative or non-finite dimension
    #[error(
        "Invalid dimensions: image {image_width}x{image_height}, canvas {canvas_width}x{canvas_height} (all must be positive)"
    )]
    InvalidDimensions {
        image_width: u32,
        image_height: u32,
        canvas_width: f64,
        canvas_height: f64,
    },
}

/// Errors that can occur while unpacking an uploaded archive or probing its images
#[derive(Debug, Clone, Error)]
pub enum ArchiveError {
    /// The upload is not a readable ZIP archive
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Archive exceeds the configured entry or size limits (should map to HTTP 413)
    #[error("Archive too large: {reason}")]
    TooLarge { reason: String },

    /// Local filesystem error in the scratch directory
    #[error("I/O error: {0}")]
    Io(String),

    /// Image header could not be read or reports unusable dimensions
    #[error("Unreadable image {file}: {message}")]
    Image { file: String, message: String },
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        ArchiveError::InvalidArchive(err.to_string())
    }
}

/// Errors produced while assembling or serializing a presentation
#[derive(Debug, Clone, Error)]
pub enum DeckError {
    /// Slide size is outside what the presentation format accepts
    #[error("Invalid slide size: {width_px}x{height_px} px (each side must be between {min_px} and {max_px} px)")]
    InvalidSlideSize {
        width_px: u32,
        height_px: u32,
        min_px: u32,
        max_px: u32,
    },

    /// A picture was placed before any slide was added
    #[error("No slide to place picture {file} on")]
    NoSlide { file: String },

    /// Picture data could not be read from disk
    #[error("Failed to read picture {file}: {message}")]
    Picture { file: String, message: String },

    /// XML part generation failed
    #[error("XML error: {0}")]
    Xml(String),

    /// ZIP packaging failed
    #[error("Packaging error: {0}")]
    Package(String),
}

impl From<std::fmt::Error> for DeckError {
    fn from(err: std::fmt::Error) -> Self {
        DeckError::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for DeckError {
    fn from(err: zip::result::ZipError) -> Self {
        DeckError::Package(err.to_string())
    }
}

/// Errors from a complete archive-to-deck build
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    /// Archive extraction failed
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Layout rejected the canvas or an image
    #[error("Layout failed for {file}: {source}")]
    Layout {
        file: String,
        #[source]
        source: LayoutError,
    },

    /// Document assembly failed
    #[error(transparent)]
    Deck(#[from] DeckError),

    /// No image in the archive could be placed on a slide
    #[error("No valid images found")]
    NoImages,

    /// The blocking build task panicked or was cancelled
    #[error("Build task failed: {0}")]
    Task(String),
}

impl BuildError {
    /// Whether this error was caused by a single image rather than the whole request.
    pub fn is_per_image(&self) -> bool {
        matches!(
            self,
            BuildError::Archive(ArchiveError::Image { .. })
                | BuildError::Layout { .. }
                | BuildError::Deck(DeckError::Picture { .. })
        )
    }
}
