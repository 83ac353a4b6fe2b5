//! Rotated bounding-box estimation.

use super::ProjectedExtent;
use crate::constants::TEXT_GLYPH_WIDTH_FACTOR;

/// Axis-aligned bounding box of a `base_width × base_height` rectangle rotated
/// about its center.
///
/// Only the magnitude of the rotation matters: `θ` and `-θ` produce the same
/// extent.
pub fn project_rotated_extent(
    base_width: f64,
    base_height: f64,
    rotation_degrees: f64,
) -> ProjectedExtent {
    let theta = rotation_degrees.abs().to_radians();
    let (sin, cos) = theta.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());

    ProjectedExtent {
        width: base_width * cos + base_height * sin,
        height: base_width * sin + base_height * cos,
    }
}

/// Estimated unrotated `(width, height)` of a text watermark.
///
/// There are no font metrics behind this: every glyph is assumed to be half
/// as wide as the font size. Tiling spacing is therefore approximate, and
/// wide or narrow scripts will be spaced too tightly or too loosely.
pub fn estimate_text_extent(font_size: f64, content: &str) -> (f64, f64) {
    let glyphs = content.chars().count() as f64;
    (font_size * glyphs * TEXT_GLYPH_WIDTH_FACTOR, font_size)
}

/// Map any angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}
