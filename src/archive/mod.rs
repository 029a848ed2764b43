//! Archive extraction and image probing.
//!
//! An uploaded ZIP archive is unpacked into a scratch directory owned by the
//! returned [`ExtractedImages`]; only entries with an image extension are
//! written. Each image can then be probed for its pixel dimensions and
//! encoding without decoding it.

mod extract;
mod probe;

pub use extract::{
    extract_images, is_image_name, ArchiveLimits, ExtractedImages, DEFAULT_MAX_ENTRIES,
    DEFAULT_MAX_EXTRACTED_BYTES, IMAGE_EXTENSIONS,
};
pub use probe::{probe_image, ProbedImage};
