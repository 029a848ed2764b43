//! Test utilities for integration tests.
//!
//! This module provides helpers for creating test images, ZIP archives and
//! multipart request bodies in memory, and for reading the generated
//! presentation back.

use std::io::{Cursor, Read, Write};

use axum::body::Body;
use axum::http::{header, Request};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage};
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

// =============================================================================
// Image Generation
// =============================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 96])
    })
}

/// Create a PNG image of the given size.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Create a JPEG image of the given size.
pub fn create_test_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder.encode_image(&gradient(width, height)).unwrap();
    buf
}

// =============================================================================
// ZIP Archive Builder
// =============================================================================

/// Builder for in-memory ZIP archives.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add a file entry.
    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Add an uncompressed file entry.
    pub fn stored_file(mut self, name: &str, data: &[u8]) -> Self {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file(name, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Add a file entry protected with legacy ZipCrypto encryption.
    pub fn encrypted_file(mut self, name: &str, data: &[u8], password: &[u8]) -> Self {
        let options = SimpleFileOptions::default().with_deprecated_encryption(password).unwrap();
        self.writer.start_file(name, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Add a directory entry.
    pub fn directory(mut self, name: &str) -> Self {
        self.writer
            .add_directory(name, SimpleFileOptions::default())
            .unwrap();
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }
}

/// Flip the last byte of `payload` inside an archive holding it uncompressed,
/// so the entry fails its checksum.
pub fn corrupt_stored_entry(archive: &mut [u8], payload: &[u8]) {
    let start = archive
        .windows(payload.len())
        .position(|window| window == payload)
        .unwrap();
    archive[start + payload.len() - 1] ^= 0xFF;
}

/// Archive with PNG images named `slide1.png` .. `slide{count}.png`, added in
/// reverse order.
pub fn create_numbered_archive(count: usize, width: u32, height: u32) -> Vec<u8> {
    let png = create_test_png(width, height);
    (1..=count)
        .rev()
        .fold(ZipBuilder::new(), |zip, i| {
            zip.file(&format!("slide{}.png", i), &png)
        })
        .build()
}

// =============================================================================
// Multipart Requests
// =============================================================================

pub const BOUNDARY: &str = "deck-builder-test-boundary";

/// Builder for `multipart/form-data` request bodies.
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Add a text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        write!(
            self.body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .unwrap();
        self
    }

    /// Add a file field.
    pub fn file(mut self, name: &str, filename: &str, data: &[u8]) -> Self {
        write!(
            self.body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .unwrap();
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Finish the body and wrap it in a `POST /` request.
    pub fn into_request(mut self) -> Request<Body> {
        write!(self.body, "--{BOUNDARY}--\r\n").unwrap();

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// Upload request carrying `archive` as `images.zip` with no other fields.
pub fn upload_request(archive: &[u8]) -> Request<Body> {
    MultipartBuilder::new()
        .file("images_zip", "images.zip", archive)
        .into_request()
}

// =============================================================================
// Presentation Inspection
// =============================================================================

/// Check the ZIP local file header magic.
pub fn is_zip(data: &[u8]) -> bool {
    data.len() >= 4 && &data[..4] == b"PK\x03\x04"
}

/// Open a generated presentation.
pub fn open_pptx(data: &[u8]) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(data.to_vec())).unwrap()
}

/// Read one part of a presentation as text.
pub fn read_part(data: &[u8], name: &str) -> String {
    let mut archive = open_pptx(data);
    let mut part = archive.by_name(name).unwrap();
    let mut text = String::new();
    part.read_to_string(&mut text).unwrap();
    text
}

/// Number of slide parts in a presentation.
pub fn slide_count(data: &[u8]) -> usize {
    let archive = open_pptx(data);
    archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .count()
}

/// Picture descriptions (source file names) in slide order.
pub fn slide_pictures(data: &[u8]) -> Vec<String> {
    (1..=slide_count(data))
        .map(|i| {
            let xml = read_part(data, &format!("ppt/slides/slide{}.xml", i));
            attribute(&xml, "descr").unwrap_or_default()
        })
        .collect()
}

/// Placement `(x, y, cx, cy)` of the first picture on a slide, in EMUs.
pub fn picture_geometry(data: &[u8], slide: usize) -> (i64, i64, i64, i64) {
    let xml = read_part(data, &format!("ppt/slides/slide{}.xml", slide));
    let pic = &xml[xml.find("<p:pic>").unwrap()..];
    let off = &pic[pic.find("<a:off").unwrap()..];
    let ext = &pic[pic.find("<a:ext").unwrap()..];
    let number = |s: &str, attr: &str| attribute(s, attr).unwrap().parse::<i64>().unwrap();
    (
        number(off, "x"),
        number(off, "y"),
        number(ext, "cx"),
        number(ext, "cy"),
    )
}

/// Value of the first ` name="..."` attribute in `xml`.
fn attribute(xml: &str, name: &str) -> Option<String> {
    let needle = format!(" {}=\"", name);
    let start = xml.find(&needle)? + needle.len();
    let end = xml[start..].find('"')? + start;
    Some(xml[start..end].to_string())
}
