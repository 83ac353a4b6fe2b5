//! PDF user space ↔ preview pixel mapping.
//!
//! The mapping is scale-only (plus the page-rect origin offset), so the two
//! directions are exact inverses up to floating-point rounding.

use super::{PageGeometry, PixelRect, Point, Size};

/// Scale-only transform between one page and its preview raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    page: PageGeometry,
    preview: Size,
    scale_x: f64,
    scale_y: f64,
}

impl PreviewTransform {
    /// Returns `None` when either the page or the preview has a non-positive
    /// or non-finite side. Callers treat that as "not ready".
    pub fn new(page: PageGeometry, preview: Size) -> Option<Self> {
        if !page.size().is_valid() || !preview.is_valid() {
            return None;
        }
        Some(Self {
            page,
            preview,
            scale_x: preview.width / page.width,
            scale_y: preview.height / page.height,
        })
    }

    pub fn page(&self) -> &PageGeometry {
        &self.page
    }

    pub fn preview_size(&self) -> Size {
        self.preview
    }

    /// Pixels per PDF unit along each axis.
    pub fn pdf_to_pixel_scale(&self) -> (f64, f64) {
        (self.scale_x, self.scale_y)
    }

    /// PDF units per pixel along each axis (drag deltas are multiplied by this).
    pub fn pixel_to_pdf_scale(&self) -> (f64, f64) {
        (
            self.page.width / self.preview.width,
            self.page.height / self.preview.height,
        )
    }

    pub fn pdf_to_pixel(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.page.origin.x) * self.scale_x,
            (p.y - self.page.origin.y) * self.scale_y,
        )
    }

    pub fn pixel_to_pdf(&self, p: Point) -> Point {
        Point::new(
            p.x / self.scale_x + self.page.origin.x,
            p.y / self.scale_y + self.page.origin.y,
        )
    }

    /// Horizontal PDF length to pixels (used for overlay font and image sizes).
    pub fn pdf_len_to_pixel(&self, len: f64) -> f64 {
        len * self.scale_x
    }

    /// Project a `[x0, y0, x1, y1]` PDF rectangle into preview pixels.
    pub fn pdf_rect_to_pixel(&self, bbox: [f64; 4]) -> PixelRect {
        let [x0, y0, x1, y1] = bbox;
        let top_left = self.pdf_to_pixel(Point::new(x0, y0));
        PixelRect::new(
            top_left.x,
            top_left.y,
            (x1 - x0) * self.scale_x,
            (y1 - y0) * self.scale_y,
        )
    }
}

/// Map a PDF point into preview pixels.
pub fn pdf_to_pixel(point: Point, page: &PageGeometry, preview: Size) -> Option<Point> {
    PreviewTransform::new(*page, preview).map(|t| t.pdf_to_pixel(point))
}

/// Map a preview pixel back into PDF user space.
pub fn pixel_to_pdf(point: Point, page: &PageGeometry, preview: Size) -> Option<Point> {
    PreviewTransform::new(*page, preview).map(|t| t.pixel_to_pdf(point))
}
