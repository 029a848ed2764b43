//! Presentation document sink.
//!
//! Builds an Office Open XML presentation (`.pptx`) with one blank slide per
//! image. Slide sizes are given in pixels and converted at 96 DPI to EMUs,
//! the unit the format uses for all geometry.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use deck_builder::deck::{DeckSink, PictureFormat, Presentation, SlideSize};
//! use deck_builder::layout::{layout, FitPolicy, ImageDescriptor};
//!
//! let mut deck = Presentation::new(SlideSize::new(1024, 768)).unwrap();
//! let placement = layout(ImageDescriptor::new(1920, 1080), deck.canvas(), FitPolicy::FitWidth).unwrap();
//!
//! deck.add_slide();
//! deck.push_picture("cover.png", Bytes::from_static(b"..."), PictureFormat::Png, placement)
//!     .unwrap();
//!
//! let pptx = deck.to_bytes().unwrap();
//! assert_eq!(&pptx[..2], b"PK");
//! ```

mod package;
mod presentation;
mod templates;

pub use presentation::{
    px_to_emu, DeckSink, Picture, PictureData, PictureFile, PictureFormat, Presentation, Slide,
    SlideSize, EMU_PER_INCH, EMU_PER_PIXEL, MAX_SLIDE_EMU, MIN_SLIDE_EMU, PPTX_CONTENT_TYPE,
};
