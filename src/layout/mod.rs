//! Slide layout core.
//!
//! Two pure components, used in this order by the pipeline:
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────────┐
//! │  Natural Order Sequencer │ ───▶ │     Slide Layout Engine      │
//! │  (file names → order)    │      │  (image + canvas + policy →  │
//! │                          │      │   width, height, left, top)  │
//! └──────────────────────────┘      └──────────────────────────────┘
//! ```
//!
//! Neither component performs I/O or holds state, so both are safe to call
//! from any number of threads at once.
//!
//! # Example
//!
//! ```
//! use deck_builder::layout::{layout, natural_sort, CanvasSize, FitPolicy, ImageDescriptor};
//!
//! let order = natural_sort(["slide10.png", "slide2.png", "slide1.png"]);
//! assert_eq!(order, ["slide1.png", "slide2.png", "slide10.png"]);
//!
//! let placement = layout(
//!     ImageDescriptor::new(600, 1200),
//!     CanvasSize::new(1024.0, 768.0),
//!     FitPolicy::from_name("fit_width"),
//! )
//! .unwrap();
//! assert_eq!((placement.width, placement.height), (384.0, 768.0));
//! assert_eq!((placement.left, placement.top), (320.0, 0.0));
//! ```

mod engine;
mod natural;

pub use engine::{layout, CanvasSize, FitPolicy, ImageDescriptor, Placement};
pub use natural::{natural_cmp, natural_sort, NaturalKey};
