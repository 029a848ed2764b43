//! Image header probing.
//!
//! Only the stored dimensions and encoding are read; pixel data is never
//! decoded, so a large photo costs a few header bytes rather than a full
//! frame buffer.

use std::path::Path;

use image::{ImageFormat, ImageReader};

use crate::deck::PictureFormat;
use crate::error::ArchiveError;
use crate::layout::ImageDescriptor;

/// Dimensions and encoding of one extracted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbedImage {
    pub descriptor: ImageDescriptor,
    pub format: PictureFormat,
}

/// Read the pixel dimensions and encoding of the image at `path`.
///
/// The encoding is detected from the file's content, not its name, so a
/// JPEG saved as `.png` is still embedded with the right media type.
///
/// # Errors
///
/// Returns [`ArchiveError::Image`] (tagged with `name`) if the file cannot be
/// opened, is not PNG or JPEG, has an unreadable header, or reports a zero
/// width or height.
pub fn probe_image(name: &str, path: &Path) -> Result<ProbedImage, ArchiveError> {
    let image_error = |message: String| ArchiveError::Image {
        file: name.to_string(),
        message,
    };

    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| image_error(e.to_string()))?;

    let format = match reader.format() {
        Some(ImageFormat::Png) => PictureFormat::Png,
        Some(ImageFormat::Jpeg) => PictureFormat::Jpeg,
        Some(other) => return Err(image_error(format!("unsupported format {other:?}"))),
        None => return Err(image_error("unrecognized image data".to_string())),
    };

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| image_error(e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(image_error(format!("empty image ({width}x{height})")));
    }

    Ok(ProbedImage {
        descriptor: ImageDescriptor::new(width, height),
        format,
    })
}

// =============================================================================
// Tests
// =============================================================================
