//! Image-to-slide placement.
//!
//! Computes where an image lands on a fixed-size slide canvas. Pure geometry:
//! no I/O, no allocation, and no units. The caller picks one linear unit
//! (pixels, inches, EMUs) for the canvas and gets the placement back in it.

use std::fmt;

use crate::error::LayoutError;

// =============================================================================
// Fit Policy
// =============================================================================

/// How an image's aspect ratio is reconciled with the slide canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FitPolicy {
    /// Span the full canvas width, shrinking to the canvas height if the
    /// image would overflow it. Preserves aspect ratio.
    FitWidth,

    /// Span the full canvas height, shrinking to the canvas width if the
    /// image would overflow it. Preserves aspect ratio.
    FitHeight,

    /// Stretch to exactly the canvas size, ignoring aspect ratio.
    Fill,

    /// Place the image at its native aspect ratio, leaving empty margins on
    /// one axis. Computed exactly like [`FitWidth`](Self::FitWidth); it is
    /// kept as a separate name because it is the fallback for unknown modes.
    #[default]
    Letterbox,
}

impl FitPolicy {
    /// All policies, in wire-name order.
    pub const ALL: [FitPolicy; 4] = [
        FitPolicy::FitWidth,
        FitPolicy::FitHeight,
        FitPolicy::Fill,
        FitPolicy::Letterbox,
    ];

    /// Resolve a wire name to a policy.
    ///
    /// Never fails: anything other than `fit_width`, `fit_height`, `fill` or
    /// `letterbox` resolves to [`Letterbox`](Self::Letterbox).
    pub fn from_name(name: &str) -> Self {
        match name {
            "fit_width" => FitPolicy::FitWidth,
            "fit_height" => FitPolicy::FitHeight,
            "fill" => FitPolicy::Fill,
            _ => FitPolicy::Letterbox,
        }
    }

    /// The wire name of this policy.
    pub fn name(&self) -> &'static str {
        match self {
            FitPolicy::FitWidth => "fit_width",
            FitPolicy::FitHeight => "fit_height",
            FitPolicy::Fill => "fill",
            FitPolicy::Letterbox => "letterbox",
        }
    }
}

impl From<&str> for FitPolicy {
    fn from(name: &str) -> Self {
        FitPolicy::from_name(name)
    }
}

impl fmt::Display for FitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Geometry Types
// =============================================================================

/// Intrinsic pixel size of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageDescriptor {
    pub width: u32,
    pub height: u32,
}

impl ImageDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height. Only meaningful when both are non-zero.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Size of the slide canvas in the caller's unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Where an image is drawn on the canvas, in canvas units.
///
/// `left`/`top` are offsets from the canvas origin (top-left corner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

// =============================================================================
// Layout
// =============================================================================

/// Compute the placement of `image` on `canvas` under `policy`.
///
/// The result is centered on both axes and, for every policy, contained in
/// the canvas. Offsets are clamped at zero so floating-point noise never
/// produces a negative position.
///
/// # Errors
///
/// Returns [`LayoutError::InvalidDimensions`] if the image has a zero side or
/// the canvas has a non-positive or non-finite side.
///
/// # Example
///
/// ```
/// use deck_builder::layout::{layout, CanvasSize, FitPolicy, ImageDescriptor};
///
/// let placement = layout(
///     ImageDescriptor::new(1920, 1080),
///     CanvasSize::new(1024.0, 768.0),
///     FitPolicy::FitWidth,
/// )
/// .unwrap();
///
/// assert_eq!(placement.width, 1024.0);
/// assert_eq!(placement.height, 576.0);
/// assert_eq!(placement.top, 96.0);
/// ```
pub fn layout(
    image: ImageDescriptor,
    canvas: CanvasSize,
    policy: FitPolicy,
) -> Result<Placement, LayoutError> {
    if image.width == 0 || image.height == 0 || !canvas.is_valid() {
        return Err(LayoutError::InvalidDimensions {
            image_width: image.width,
            image_height: image.height,
            canvas_width: canvas.width,
            canvas_height: canvas.height,
        });
    }

    let aspect = image.aspect();

    let (width, height) = match policy {
        FitPolicy::FitWidth | FitPolicy::Letterbox => fit_width(aspect, canvas),
        FitPolicy::FitHeight => fit_height(aspect, canvas),
        FitPolicy::Fill => (canvas.width, canvas.height),
    };

    Ok(Placement {
        left: ((canvas.width - width) / 2.0).max(0.0),
        top: ((canvas.height - height) / 2.0).max(0.0),
        width,
        height,
    })
}

/// Full width first; shrink to the canvas height on overflow.
fn fit_width(aspect: f64, canvas: CanvasSize) -> (f64, f64) {
    let width = canvas.width;
    let height = width / aspect;
    if height > canvas.height {
        (canvas.height * aspect, canvas.height)
    } else {
        (width, height)
    }
}

/// Full height first; shrink to the canvas width on overflow.
fn fit_height(aspect: f64, canvas: CanvasSize) -> (f64, f64) {
    let height = canvas.height;
    let width = height * aspect;
    if width > canvas.width {
        (canvas.width, canvas.width / aspect)
    } else {
        (width, height)
    }
}

// =============================================================================
// Tests
// =============================================================================
