//! ZIP extraction into a per-request scratch directory.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::error::ArchiveError;

/// Extensions accepted as slide images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Default maximum number of entries in an uploaded archive.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Default maximum total size of extracted images (1 GiB).
pub const DEFAULT_MAX_EXTRACTED_BYTES: u64 = 1024 * 1024 * 1024;

/// Prefix of the scratch directory created for each archive.
const SCRATCH_PREFIX: &str = "deck-builder-";

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Whether `name` has one of the accepted image extensions.
pub fn is_image_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Entries that only carry archiver metadata, never slide content.
fn is_metadata_entry(name: &str) -> bool {
    name.split('/')
        .any(|part| part == "__MACOSX" || part.starts_with("._"))
}

// =============================================================================
// Limits
// =============================================================================

/// Bounds applied while unpacking an untrusted archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Maximum number of entries (files and directories) in the archive
    pub max_entries: usize,

    /// Maximum total number of bytes written for accepted images
    pub max_extracted_bytes: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_extracted_bytes: DEFAULT_MAX_EXTRACTED_BYTES,
        }
    }
}

// =============================================================================
// Extracted Images
// =============================================================================

/// Image files unpacked from one archive.
///
/// Files live in a uniquely named temporary directory that is deleted when
/// this value is dropped, whichever way the request ends. Image entries whose
/// data could not be read are kept by name so callers can report them.
#[derive(Debug)]
pub struct ExtractedImages {
    dir: TempDir,
    files: HashMap<String, PathBuf>,
    unreadable: HashMap<String, String>,
}

impl ExtractedImages {
    /// Archive entry names of all image entries, readable or not, in no
    /// particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files
            .keys()
            .chain(self.unreadable.keys())
            .map(String::as_str)
    }

    /// On-disk location of the image extracted from entry `name`.
    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.files.get(name).map(PathBuf::as_path)
    }

    /// Like [`path_of`](Self::path_of), but explains why an entry has no file.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::Image`] if the entry could not be read from the archive
    /// or is not one of the extracted images.
    pub fn locate(&self, name: &str) -> Result<&Path, ArchiveError> {
        if let Some(path) = self.path_of(name) {
            return Ok(path);
        }

        let message = self
            .unreadable
            .get(name)
            .cloned()
            .unwrap_or_else(|| "not an extracted image".to_string());
        Err(ArchiveError::Image {
            file: name.to_string(),
            message,
        })
    }

    /// Number of image entries, including unreadable ones.
    pub fn len(&self) -> usize {
        self.files.len() + self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scratch directory holding the files.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Unpack every image entry of the ZIP archive in `data`.
///
/// Directories, non-image entries, archiver metadata (`__MACOSX/`, `._*`)
/// and entries whose path would escape the scratch directory are skipped
/// without being opened. Duplicate entry names keep the first occurrence.
/// Each image is written to its own file named after its archive index, so
/// names that resolve to the same path never overwrite each other.
///
/// An image entry that cannot be decrypted, decompressed or checksummed does
/// not fail extraction; it is recorded and reported by
/// [`ExtractedImages::locate`].
///
/// # Errors
///
/// - [`ArchiveError::InvalidArchive`] if `data` is not a readable ZIP file
/// - [`ArchiveError::TooLarge`] if the archive exceeds `limits`
/// - [`ArchiveError::Io`] if the scratch directory cannot be written
pub fn extract_images(data: &[u8], limits: &ArchiveLimits) -> Result<ExtractedImages, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    if archive.len() > limits.max_entries {
        return Err(ArchiveError::TooLarge {
            reason: format!(
                "{} entries (limit is {})",
                archive.len(),
                limits.max_entries
            ),
        });
    }

    let dir = tempfile::Builder::new().prefix(SCRATCH_PREFIX).tempdir()?;
    let mut files = HashMap::new();
    let mut unreadable = HashMap::new();
    let mut remaining = limits.max_extracted_bytes;

    for index in 0..archive.len() {
        let Some(name) = archive.name_for_index(index).map(str::to_string) else {
            continue;
        };

        if name.ends_with('/') || !is_image_name(&name) || is_metadata_entry(&name) {
            debug!(entry = %name, "Skipping archive entry");
            continue;
        }

        if files.contains_key(&name) || unreadable.contains_key(&name) {
            debug!(entry = %name, "Skipping duplicate archive entry");
            continue;
        }

        let enclosed = match archive.by_index_raw(index) {
            Ok(raw) => raw.enclosed_name().is_some(),
            Err(err) => {
                debug!(entry = %name, error = %err, "Unreadable archive entry");
                unreadable.insert(name, err.to_string());
                continue;
            }
        };
        if !enclosed {
            debug!(entry = %name, "Skipping archive entry with unsafe path");
            continue;
        }

        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(entry = %name, error = %err, "Unreadable archive entry");
                unreadable.insert(name, err.to_string());
                continue;
            }
        };

        let target = dir.path().join(format!("{}.img", index));
        match copy_bounded(&mut entry, &target, remaining)? {
            Copied::Complete(written) => {
                remaining -= written;
                files.insert(name, target);
            }
            Copied::Unreadable { read, message } => {
                debug!(entry = %name, error = %message, "Unreadable archive entry");
                remaining -= read;
                unreadable.insert(name, message);
            }
        }
    }

    debug!(
        images = files.len(),
        unreadable = unreadable.len(),
        dir = %dir.path().display(),
        "Extracted archive"
    );

    Ok(ExtractedImages {
        dir,
        files,
        unreadable,
    })
}

/// Outcome of copying one entry.
enum Copied {
    Complete(u64),

    /// The entry data failed to read after `read` bytes were written.
    Unreadable { read: u64, message: String },
}

/// Copy `reader` to `target`, failing once more than `budget` bytes arrive.
///
/// Declared entry sizes are not trusted; the count is taken from the data.
/// Read errors belong to the entry and are returned as
/// [`Copied::Unreadable`]; write errors fail the whole extraction.
fn copy_bounded<R: Read>(reader: &mut R, target: &Path, budget: u64) -> Result<Copied, ArchiveError> {
    let mut output = File::create(target)?;
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Ok(Copied::Unreadable {
                    read: written,
                    message: e.to_string(),
                })
            }
        };

        written += n as u64;
        if written > budget {
            return Err(ArchiveError::TooLarge {
                reason: "extracted images exceed the size limit".to_string(),
            });
        }
        output.write_all(&buf[..n])?;
    }

    Ok(Copied::Complete(written))
}

// =============================================================================
// Tests
// =============================================================================
