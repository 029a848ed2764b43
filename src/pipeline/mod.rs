//! Pipeline orchestration.
//!
//! [`DeckService`] ties the pieces together: it unpacks an archive, orders
//! the images naturally, lays each one out on the slide canvas and feeds the
//! result into a [`DeckSink`](crate::deck::DeckSink).
//!
//! Per-image failures (a corrupt PNG, an image with zero height) are handled
//! according to [`ImageErrorPolicy`]; anything wrong with the request as a
//! whole always fails the build.

mod service;

pub use service::{
    DeckOptions, DeckOutput, DeckService, ImageErrorPolicy, PlacementReport, SkippedImage,
    DEFAULT_SLIDE_HEIGHT_PX, DEFAULT_SLIDE_WIDTH_PX,
};
