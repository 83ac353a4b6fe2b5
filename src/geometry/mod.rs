//! Geometry kernel for watermark placement and preview mapping.
//!
//! Two coordinate spaces meet here:
//!
//! - **PDF user space**: the page's own units (points for most documents),
//!   optionally offset by the page rectangle's origin.
//! - **Preview pixels**: the on-screen raster the user interacts with,
//!   origin top-left, +X right, +Y down.
//!
//! Everything in this module is pure: no I/O, no state, no logging.

mod extent;
mod transform;

pub use extent::{estimate_text_extent, normalize_degrees, project_rotated_extent};
pub use transform::{pdf_to_pixel, pixel_to_pdf, PreviewTransform};

use serde::{Deserialize, Serialize};

/// A point in either PDF user space or preview pixels (context decides).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when both sides are strictly positive and finite.
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Dimensions of one document page in PDF user units.
///
/// `origin` is the top-left corner of the page's visible rectangle. Most pages
/// start at `(0, 0)`, but cropped pages may not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub origin: Point,
}

impl PageGeometry {
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin: Point::zero(),
        }
    }

    pub const fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Build from a `[x0, y0, x1, y1]` page rectangle.
    pub fn from_rect(rect: [f64; 4]) -> Self {
        let [x0, y0, x1, y1] = rect;
        Self::new(x1 - x0, y1 - y0).with_origin(Point::new(x0, y0))
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned bounding box of a rotated element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectedExtent {
    pub width: f64,
    pub height: f64,
}

/// Axis-aligned rectangle in preview pixels (top-left origin).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: `[min, max)`.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.x + self.width && p.y < self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}
