//! End-to-end tests for the build pipeline without the HTTP layer.
//!
//! Tests verify:
//! - Slide size and picture geometry for each fit policy
//! - Media parts and content types for mixed PNG/JPEG archives
//! - Ordering across nested directories
//! - Skip and abort handling of unreadable images

use std::sync::Arc;

use deck_builder::archive::extract_images;
use deck_builder::deck::{Presentation, EMU_PER_PIXEL};
use deck_builder::error::{ArchiveError, BuildError};
use deck_builder::layout::FitPolicy;
use deck_builder::pipeline::{DeckOptions, DeckService, ImageErrorPolicy};

use super::test_utils::{
    corrupt_stored_entry, create_numbered_archive, create_test_jpeg, create_test_png, open_pptx,
    picture_geometry, read_part, slide_count, slide_pictures, ZipBuilder,
};

fn options(width: u32, height: u32, fit_mode: &str) -> DeckOptions {
    DeckOptions {
        slide_width_px: width,
        slide_height_px: height,
        fit_policy: FitPolicy::from_name(fit_mode),
    }
}

fn emu(px: i64) -> i64 {
    px * EMU_PER_PIXEL
}

// =============================================================================
// Geometry
// =============================================================================

#[test]
fn test_geometry_per_policy() {
    // 400x100 image on an 800x600 slide.
    let archive = ZipBuilder::new()
        .file("banner.png", &create_test_png(400, 100))
        .build();
    let service = DeckService::new();

    let cases = [
        ("fit_width", (0, 200, 800, 200)),
        ("fit_height", (0, 200, 800, 200)),
        ("fill", (0, 0, 800, 600)),
        ("letterbox", (0, 200, 800, 200)),
    ];

    for (mode, (x, y, cx, cy)) in cases {
        let output = service.build(&archive, &options(800, 600, mode)).unwrap();
        assert_eq!(
            picture_geometry(&output.document, 1),
            (emu(x), emu(y), emu(cx), emu(cy)),
            "fit mode {}",
            mode
        );
    }
}

#[test]
fn test_fit_height_on_portrait_slide() {
    let archive = ZipBuilder::new()
        .file("square.png", &create_test_png(100, 100))
        .build();

    let output = DeckService::new()
        .build(&archive, &options(600, 900, "fit_height"))
        .unwrap();

    // Full height would be 900 wide, so it shrinks to the slide width.
    assert_eq!(
        picture_geometry(&output.document, 1),
        (0, emu(150), emu(600), emu(600))
    );
}

#[test]
fn test_slide_size_written() {
    let output = DeckService::new()
        .build(&create_numbered_archive(1, 8, 8), &options(1280, 720, "fill"))
        .unwrap();

    let presentation = read_part(&output.document, "ppt/presentation.xml");
    assert!(presentation.contains(&format!(
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        emu(1280),
        emu(720)
    )));
}

// =============================================================================
// Package Contents
// =============================================================================

#[test]
fn test_mixed_formats() {
    let archive = ZipBuilder::new()
        .file("b.jpeg", &create_test_jpeg(32, 24, 85))
        .file("a.png", &create_test_png(32, 24))
        .file("c.JPG", &create_test_jpeg(24, 32, 85))
        .build();

    let output = DeckService::new()
        .build(&archive, &DeckOptions::default())
        .unwrap();
    assert_eq!(output.slide_count, 3);
    assert!(output.skipped.is_empty());

    let content_types = read_part(&output.document, "[Content_Types].xml");
    assert!(content_types.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
    assert!(content_types.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));

    let mut pptx = open_pptx(&output.document);
    assert!(pptx.by_name("ppt/media/image1.png").is_ok());
    assert!(pptx.by_name("ppt/media/image2.jpeg").is_ok());
    assert!(pptx.by_name("ppt/media/image3.jpeg").is_ok());

    let rels = read_part(&output.document, "ppt/slides/_rels/slide2.xml.rels");
    assert!(rels.contains("../media/image2.jpeg"));
}

#[test]
fn test_media_bytes_are_copied_verbatim() {
    let png = create_test_png(20, 10);
    let archive = ZipBuilder::new().file("only.png", &png).build();

    let output = DeckService::new()
        .build(&archive, &DeckOptions::default())
        .unwrap();

    let mut pptx = open_pptx(&output.document);
    let mut media = pptx.by_name("ppt/media/image1.png").unwrap();
    let mut copied = Vec::new();
    std::io::Read::read_to_end(&mut media, &mut copied).unwrap();
    assert_eq!(copied, png);
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn test_natural_order_across_directories() {
    let png = create_test_png(8, 8);
    let archive = ZipBuilder::new()
        .file("part2/img1.png", &png)
        .file("part10/img1.png", &png)
        .file("part1/img10.png", &png)
        .file("part1/img9.png", &png)
        .build();

    let output = DeckService::new()
        .build(&archive, &DeckOptions::default())
        .unwrap();

    assert_eq!(
        slide_pictures(&output.document),
        vec![
            "part1/img9.png",
            "part1/img10.png",
            "part2/img1.png",
            "part10/img1.png",
        ]
    );
}

#[test]
fn test_place_images_into_presentation() {
    let archive = create_numbered_archive(12, 8, 8);
    let images = extract_images(&archive, &Default::default()).unwrap();
    let mut presentation = Presentation::new(DeckOptions::default().slide_size()).unwrap();

    let report = DeckService::new()
        .place_images(&images, FitPolicy::FitWidth, &mut presentation)
        .unwrap();

    let expected: Vec<String> = (1..=12).map(|i| format!("slide{}.png", i)).collect();
    assert_eq!(report.placed, expected);
    assert_eq!(presentation.slide_count(), 12);
}

// =============================================================================
// Unreadable Images
// =============================================================================

fn archive_with_broken_image() -> Vec<u8> {
    ZipBuilder::new()
        .file("1.png", &create_test_png(8, 8))
        .file("2.jpg", b"\xFF\xD8\xFF garbage")
        .file("3.png", &create_test_png(8, 8))
        .build()
}

#[test]
fn test_skip_policy_leaves_no_gap() {
    let output = DeckService::new()
        .build(&archive_with_broken_image(), &DeckOptions::default())
        .unwrap();

    assert_eq!(output.slide_count, 2);
    assert_eq!(slide_count(&output.document), 2);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].name, "2.jpg");
    assert_eq!(slide_pictures(&output.document), vec!["1.png", "3.png"]);
}

#[test]
fn test_abort_policy_fails_build() {
    let service = DeckService::new().with_image_error_policy(ImageErrorPolicy::Abort);
    let err = service
        .build(&archive_with_broken_image(), &DeckOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::Archive(ArchiveError::Image { ref file, .. }) if file == "2.jpg"
    ));
}

#[test]
fn test_entry_failing_checksum_is_skipped() {
    let second = create_test_png(8, 8);
    let mut archive = ZipBuilder::new()
        .stored_file("1.png", &create_test_png(4, 4))
        .stored_file("2.png", &second)
        .build();
    corrupt_stored_entry(&mut archive, &second);

    let output = DeckService::new()
        .build(&archive, &DeckOptions::default())
        .unwrap();
    assert_eq!(output.slide_count, 1);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].name, "2.png");

    let err = DeckService::new()
        .with_image_error_policy(ImageErrorPolicy::Abort)
        .build(&archive, &DeckOptions::default())
        .unwrap_err();
    assert!(err.is_per_image());
}

#[test]
fn test_encrypted_entries_do_not_fail_archive() {
    let archive = ZipBuilder::new()
        .file("1.png", &create_test_png(8, 8))
        .encrypted_file("secret.txt", b"hidden notes", b"password")
        .encrypted_file("2.png", &create_test_png(8, 8), b"password")
        .build();

    let output = DeckService::new()
        .build(&archive, &DeckOptions::default())
        .unwrap();
    assert_eq!(slide_pictures(&output.document), vec!["1.png"]);
    assert_eq!(output.skipped.len(), 1);
    assert_eq!(output.skipped[0].name, "2.png");
}

#[test]
fn test_names_with_same_path_keep_own_content() {
    let archive = ZipBuilder::new()
        .file("a/b.png", &create_test_png(8, 8))
        .file("a/./b.png", &create_test_png(16, 4))
        .build();

    let output = DeckService::new()
        .build(&archive, &options(800, 400, "fit_width"))
        .unwrap();
    assert_eq!(output.slide_count, 2);

    // Square image: pillarboxed. 4:1 image: full width, letterboxed.
    let geometries = [
        picture_geometry(&output.document, 1),
        picture_geometry(&output.document, 2),
    ];
    assert!(geometries.contains(&(emu(200), 0, emu(400), emu(400))));
    assert!(geometries.contains(&(0, emu(100), emu(800), emu(200))));

    let mut pptx = open_pptx(&output.document);
    let sizes: Vec<u64> = (1..=2)
        .map(|i| pptx.by_name(&format!("ppt/media/image{}.png", i)).unwrap().size())
        .collect();
    assert_ne!(sizes[0], sizes[1]);
}

#[tokio::test]
async fn test_spawn_build_matches_build() {
    let archive = create_numbered_archive(2, 16, 9);
    let service = Arc::new(DeckService::new());

    let output = service
        .clone()
        .spawn_build(archive.clone().into(), DeckOptions::default())
        .await
        .unwrap();
    let direct = service.build(&archive, &DeckOptions::default()).unwrap();

    assert_eq!(output.slide_count, direct.slide_count);
    assert_eq!(
        slide_pictures(&output.document),
        slide_pictures(&direct.document)
    );
}
