//! Placement calculation for watermark instances.
//!
//! This module turns a [`WatermarkSpec`] and a page size into the ordered
//! list of instance centers the rendering engine will draw.
//!
//! # Layouts
//!
//! - **Single**: one instance at a user-chosen point (page center by default)
//! - **Grid3x3**: nine instances at the centers of a uniform 3×3 partition
//! - **Tiled**: a `cols × rows` grid whose spacing follows the rotated
//!   extent of one instance and the chosen density
//!
//! Output is deterministic: the same inputs always give the same values in
//! the same order. The preview overlay and the rendering engine both consume
//! this list, so they must agree exactly.
//!
//! # Example
//!
//! ```
//! use markplace::geometry::PageGeometry;
//! use markplace::watermark::{generate_placements, Layout, WatermarkSpec};
//!
//! let spec = WatermarkSpec::text("DRAFT").with_layout(Layout::Grid3x3);
//! let page = PageGeometry::new(300.0, 300.0);
//! let placements = generate_placements(&spec, &page, None);
//! assert_eq!(placements.len(), 9);
//! assert_eq!((placements[0].x, placements[0].y), (50.0, 50.0));
//! ```

use std::ops::Index;

use super::{Density, Layout, WatermarkContent, WatermarkSpec};
use crate::backend::wire::{ImageElement, TextElement, WireElement};
use crate::constants::{GRID_DIVISIONS, MAX_TILE_COLUMNS, MAX_TILE_ROWS, MIN_TILE_STEP};
use crate::geometry::{PageGeometry, Point, ProjectedExtent};

/// Center of one watermark instance in PDF user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

impl Placement {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Point> for Placement {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

/// Ordered placements for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementSet {
    placements: Vec<Placement>,
}

impl PlacementSet {
    pub fn new(placements: Vec<Placement>) -> Self {
        Self { placements }
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Placement> {
        self.placements.iter()
    }

    pub fn as_slice(&self) -> &[Placement] {
        &self.placements
    }

    /// Wire elements for the rendering engine, one per placement, carrying
    /// the recipe's visual attributes.
    pub fn to_wire(&self, spec: &WatermarkSpec) -> Vec<WireElement> {
        self.placements
            .iter()
            .map(|p| wire_element(spec, *p))
            .collect()
    }
}

impl Index<usize> for PlacementSet {
    type Output = Placement;

    fn index(&self, index: usize) -> &Placement {
        &self.placements[index]
    }
}

impl<'a> IntoIterator for &'a PlacementSet {
    type Item = &'a Placement;
    type IntoIter = std::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}

/// Column/row layout chosen for tiled placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGrid {
    pub cols: usize,
    pub rows: usize,
    pub step_x: f64,
    pub step_y: f64,
}

/// Generate placements for one page.
///
/// `fixed` is only consulted for [`Layout::Single`].
pub fn generate_placements(
    spec: &WatermarkSpec,
    page: &PageGeometry,
    fixed: Option<Point>,
) -> PlacementSet {
    let placements = match spec.layout {
        Layout::Single => vec![single_position(page, fixed)],
        Layout::Grid3x3 => grid_positions(page, GRID_DIVISIONS, GRID_DIVISIONS),
        Layout::Tiled => {
            let grid = tiled_grid(page, spec.projected_extent(), spec.density);
            grid_positions(page, grid.cols, grid.rows)
        }
    };

    tracing::trace!(
        layout = ?spec.layout,
        count = placements.len(),
        page_width = page.width,
        page_height = page.height,
        "Generated watermark placements"
    );

    PlacementSet::new(placements)
}

/// The single-point placement: `fixed` when given, otherwise page center.
pub fn single_position(page: &PageGeometry, fixed: Option<Point>) -> Placement {
    fixed.unwrap_or_else(|| page.center()).into()
}

/// Centers of a uniform `cols × rows` partition, column by column.
///
/// Cell `(i, j)` has its center at `((w / cols)(i + 0.5), (h / rows)(j + 0.5))`.
/// `cols` and `rows` of zero are treated as one.
pub fn grid_positions(page: &PageGeometry, cols: usize, rows: usize) -> Vec<Placement> {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let cell_w = page.width / cols as f64;
    let cell_h = page.height / rows as f64;

    let mut positions = Vec::with_capacity(cols * rows);
    for i in 0..cols {
        for j in 0..rows {
            positions.push(Placement::new(
                cell_w * (i as f64 + 0.5),
                cell_h * (j as f64 + 0.5),
            ));
        }
    }
    positions
}

/// Choose the tiling grid for a page.
///
/// The step along each axis is the projected extent times the density
/// multiplier, never less than [`MIN_TILE_STEP`]. Counts are clamped to
/// `1..=15` columns and `1..=20` rows whatever the page size, including
/// zero, negative or non-finite dimensions.
pub fn tiled_grid(page: &PageGeometry, extent: ProjectedExtent, density: Density) -> TileGrid {
    let (mx, my) = density.multiplier();
    let step_x = step(extent.width * mx);
    let step_y = step(extent.height * my);

    TileGrid {
        cols: fit_count(page.width, step_x, MAX_TILE_COLUMNS),
        rows: fit_count(page.height, step_y, MAX_TILE_ROWS),
        step_x,
        step_y,
    }
}

fn step(raw: f64) -> f64 {
    // f64::max ignores NaN, so a NaN extent falls back to the minimum step
    raw.max(MIN_TILE_STEP)
}

fn fit_count(length: f64, step: f64, max: usize) -> usize {
    // `as usize` saturates: NaN and negatives become 0, +inf becomes usize::MAX
    ((length / step).floor() as usize).clamp(1, max)
}

fn wire_element(spec: &WatermarkSpec, placement: Placement) -> WireElement {
    match &spec.content {
        WatermarkContent::Text(text) => WireElement::Text(TextElement {
            x: placement.x,
            y: placement.y,
            angle: spec.rotation_degrees,
            opacity: spec.opacity,
            text: text.content.clone(),
            fontsize: text.font_size,
            color: text.color.clone(),
            fontname: text.font_family.wire_name().to_string(),
        }),
        WatermarkContent::Image(image) => WireElement::Image(ImageElement {
            x: placement.x,
            y: placement.y,
            angle: spec.rotation_degrees,
            opacity: spec.opacity,
            scale: image.scale,
            is_placeholder: true,
        }),
    }
}
