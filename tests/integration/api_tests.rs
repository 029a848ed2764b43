//! API integration tests for the upload form and presentation endpoint.
//!
//! Tests verify:
//! - Form and health endpoints
//! - Successful uploads (headers, slide order, slide size)
//! - Error cases (missing file, wrong extension, bad fields, no images, limits)
//! - HTTP response codes and JSON error bodies

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use deck_builder::archive::ArchiveLimits;
use deck_builder::deck::{EMU_PER_PIXEL, PPTX_CONTENT_TYPE};
use deck_builder::pipeline::{DeckService, ImageErrorPolicy};
use deck_builder::{create_router, RouterConfig};

use super::test_utils::{
    create_numbered_archive, create_test_jpeg, create_test_png, is_zip, picture_geometry,
    read_part, slide_count, slide_pictures, upload_request, MultipartBuilder, ZipBuilder,
};

fn router() -> Router {
    create_router(DeckService::new(), RouterConfig::new().with_tracing(false))
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

async fn error_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// =============================================================================
// Form and Health
// =============================================================================

#[tokio::test]
async fn test_form_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains(r#"name="images_zip""#));
    assert!(html.contains(r#"value="1920""#));
    assert!(html.contains(r#"value="1080""#));
}

#[tokio::test]
async fn test_health_check() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = error_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_unknown_route() {
    let request = Request::builder()
        .uri("/slides")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Successful Uploads
// =============================================================================

#[tokio::test]
async fn test_upload_returns_presentation() {
    let archive = create_numbered_archive(3, 64, 36);
    let response = router().oneshot(upload_request(&archive)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get("content-type").unwrap(), PPTX_CONTENT_TYPE);
    assert_eq!(
        headers.get("content-disposition").unwrap(),
        r#"attachment; filename="presentation.pptx""#
    );
    assert_eq!(headers.get("x-slide-count").unwrap(), "3");
    assert_eq!(headers.get("x-skipped-images").unwrap(), "0");

    let body = body_bytes(response).await;
    assert!(is_zip(&body), "Response should be a ZIP package");
    assert_eq!(slide_count(&body), 3);
}

#[tokio::test]
async fn test_slides_follow_natural_order() {
    let png = create_test_png(16, 16);
    let archive = ZipBuilder::new()
        .file("slide10.png", &png)
        .file("slide2.png", &png)
        .file("Slide1.PNG", &png)
        .build();

    let response = router().oneshot(upload_request(&archive)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_bytes(response).await;
    assert_eq!(
        slide_pictures(&body),
        vec!["Slide1.PNG", "slide2.png", "slide10.png"]
    );
}

#[tokio::test]
async fn test_default_slide_size_and_fit() {
    // 1920x1080 default slide, 16:9 image: fills the slide exactly.
    let archive = ZipBuilder::new()
        .file("wide.png", &create_test_png(160, 90))
        .build();

    let response = router().oneshot(upload_request(&archive)).await.unwrap();
    let body = body_bytes(response).await;

    let presentation = read_part(&body, "ppt/presentation.xml");
    assert!(presentation.contains(&format!(
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        1920 * EMU_PER_PIXEL,
        1080 * EMU_PER_PIXEL
    )));
    assert_eq!(
        picture_geometry(&body, 1),
        (0, 0, 1920 * EMU_PER_PIXEL, 1080 * EMU_PER_PIXEL)
    );
}

#[tokio::test]
async fn test_custom_size_and_fit_height() {
    let archive = ZipBuilder::new()
        .file("photo.jpg", &create_test_jpeg(192, 108, 90))
        .build();
    let request = MultipartBuilder::new()
        .text("slide_width_px", "1024")
        .text("slide_height_px", "768")
        .text("fit_mode", "fit_height")
        .file("images_zip", "photos.zip", &archive)
        .into_request();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;

    // Wider than the slide: clamps to full width, centered vertically.
    assert_eq!(
        picture_geometry(&body, 1),
        (
            0,
            96 * EMU_PER_PIXEL,
            1024 * EMU_PER_PIXEL,
            576 * EMU_PER_PIXEL
        )
    );

    let mut pptx = super::test_utils::open_pptx(&body);
    assert!(pptx.by_name("ppt/media/image1.jpeg").is_ok());
}

#[tokio::test]
async fn test_tall_image_is_pillarboxed() {
    let archive = ZipBuilder::new()
        .file("tall.png", &create_test_png(60, 120))
        .build();
    let request = MultipartBuilder::new()
        .file("images_zip", "tall.zip", &archive)
        .text("slide_width_px", "1000")
        .text("slide_height_px", "500")
        .text("fit_mode", "fit_width")
        .into_request();

    let response = router().oneshot(request).await.unwrap();
    let body = body_bytes(response).await;

    assert_eq!(
        picture_geometry(&body, 1),
        (
            375 * EMU_PER_PIXEL,
            0,
            250 * EMU_PER_PIXEL,
            500 * EMU_PER_PIXEL
        )
    );
}

#[tokio::test]
async fn test_fill_stretches_to_slide() {
    let archive = ZipBuilder::new()
        .file("square.png", &create_test_png(50, 50))
        .build();
    let request = MultipartBuilder::new()
        .file("images_zip", "square.zip", &archive)
        .text("slide_width_px", "800")
        .text("slide_height_px", "400")
        .text("fit_mode", "fill")
        .into_request();

    let body = body_bytes(router().oneshot(request).await.unwrap()).await;
    assert_eq!(
        picture_geometry(&body, 1),
        (0, 0, 800 * EMU_PER_PIXEL, 400 * EMU_PER_PIXEL)
    );
}

#[tokio::test]
async fn test_unknown_fit_mode_falls_back_to_letterbox() {
    let archive = ZipBuilder::new()
        .file("tall.png", &create_test_png(60, 120))
        .build();

    let mut geometries = Vec::new();
    for mode in ["banana", "letterbox"] {
        let request = MultipartBuilder::new()
            .file("images_zip", "tall.zip", &archive)
            .text("slide_width_px", "1000")
            .text("slide_height_px", "500")
            .text("fit_mode", mode)
            .into_request();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        geometries.push(picture_geometry(&body_bytes(response).await, 1));
    }

    assert_eq!(geometries[0], geometries[1]);
}

#[tokio::test]
async fn test_non_image_entries_ignored() {
    let archive = ZipBuilder::new()
        .directory("deck/")
        .file("deck/1.png", &create_test_png(8, 8))
        .file("deck/notes.txt", b"speaker notes")
        .file("__MACOSX/deck/._1.png", b"resource fork")
        .build();

    let response = router().oneshot(upload_request(&archive)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-slide-count").unwrap(), "1");
}

#[tokio::test]
async fn test_corrupt_image_is_skipped() {
    let archive = ZipBuilder::new()
        .file("1.png", &create_test_png(8, 8))
        .file("2.png", b"not really a png")
        .file("3.jpg", &create_test_jpeg(8, 8, 80))
        .build();

    let response = router().oneshot(upload_request(&archive)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-slide-count").unwrap(), "2");
    assert_eq!(response.headers().get("x-skipped-images").unwrap(), "1");

    let body = body_bytes(response).await;
    assert_eq!(slide_pictures(&body), vec!["1.png", "3.jpg"]);
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_missing_file() {
    let request = MultipartBuilder::new()
        .text("slide_width_px", "1024")
        .into_request();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = error_json(response).await;
    assert_eq!(error["error"], "invalid_upload");
    assert_eq!(error["status"], 400);
}

#[tokio::test]
async fn test_wrong_extension() {
    let archive = create_numbered_archive(1, 8, 8);
    let request = MultipartBuilder::new()
        .file("images_zip", "images.tar", &archive)
        .into_request();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_json(response).await["error"], "invalid_upload");
}

#[tokio::test]
async fn test_invalid_width() {
    let archive = create_numbered_archive(1, 8, 8);
    let request = MultipartBuilder::new()
        .text("slide_width_px", "wide")
        .file("images_zip", "images.zip", &archive)
        .into_request();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_json(response).await["error"], "invalid_request");
}

#[tokio::test]
async fn test_slide_size_out_of_range() {
    let archive = create_numbered_archive(1, 8, 8);
    let request = MultipartBuilder::new()
        .text("slide_width_px", "0")
        .file("images_zip", "images.zip", &archive)
        .into_request();

    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_json(response).await["error"], "invalid_slide_size");
}

#[tokio::test]
async fn test_archive_without_images() {
    let archive = ZipBuilder::new()
        .file("readme.txt", b"nothing to see")
        .build();

    let response = router().oneshot(upload_request(&archive)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = error_json(response).await;
    assert_eq!(error["error"], "no_images");
    assert_eq!(error["message"], "No valid images found.");
}

#[tokio::test]
async fn test_only_broken_images() {
    let archive = ZipBuilder::new().file("a.png", b"broken").build();

    let response = router().oneshot(upload_request(&archive)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_json(response).await["error"], "no_images");
}

#[tokio::test]
async fn test_corrupt_archive() {
    let response = router()
        .oneshot(upload_request(b"this is not a zip file"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_json(response).await["error"], "invalid_archive");
}

#[tokio::test]
async fn test_abort_on_corrupt_image() {
    let service = DeckService::new().with_image_error_policy(ImageErrorPolicy::Abort);
    let router = create_router(service, RouterConfig::new().with_tracing(false));
    let archive = ZipBuilder::new()
        .file("1.png", &create_test_png(8, 8))
        .file("2.png", b"not really a png")
        .build();

    let response = router.oneshot(upload_request(&archive)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error = error_json(response).await;
    assert_eq!(error["error"], "image_error");
    assert!(error["message"].as_str().unwrap().contains("2.png"));
}

#[tokio::test]
async fn test_archive_entry_limit() {
    let service = DeckService::new().with_limits(ArchiveLimits {
        max_entries: 2,
        ..ArchiveLimits::default()
    });
    let router = create_router(service, RouterConfig::new().with_tracing(false));

    let response = router
        .oneshot(upload_request(&create_numbered_archive(3, 8, 8)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_json(response).await["error"], "archive_too_large");
}

#[tokio::test]
async fn test_upload_body_limit() {
    let router = create_router(
        DeckService::new(),
        RouterConfig::new()
            .with_max_upload_bytes(1024)
            .with_tracing(false),
    );
    let request = upload_request(&vec![0u8; 8 * 1024]);

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
