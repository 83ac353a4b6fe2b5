//! Watermark recipes and placement generation.
//!
//! This module describes *what* watermark the user composed and *where*
//! its instances go on a page. It never draws anything: the rendering
//! engine burns the placements into the PDF, and the preview overlay draws
//! a single instance locally.
//!
//! # Features
//!
//! - **Text watermarks** with font family, size and color
//! - **Image watermarks** sized from the uploaded image and a scale factor
//! - **3 layouts**: single point, 3×3 grid, and density-controlled tiling
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   content:
//!     type: text
//!     content: "CONFIDENTIAL"
//!     font_size: 50
//!     color: "#FF0000"
//!   opacity: 0.3
//!   rotation_degrees: 45
//!   layout: tiled
//!   density: moderate
//! ```

pub mod config;
pub mod error;
pub mod position;

// Re-export main types for convenience
pub use config::{
    Density, FontFamily, ImageAttributes, Layout, TextAttributes, WatermarkContent, WatermarkSpec,
};
pub use error::WatermarkError;
pub use position::{
    generate_placements, grid_positions, single_position, tiled_grid, Placement, PlacementSet,
    TileGrid,
};
