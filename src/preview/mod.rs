//! Preview synchronization.
//!
//! Decides when the displayed page raster must be refreshed by the rendering
//! engine. Single-point watermarks are drawn locally over a clean raster, so
//! moving or restyling them never costs a round-trip; grid and tiled layouts
//! are always rendered by the engine.

pub mod state;
pub mod synchronizer;

pub use state::{PreviewFrame, PreviewMode, RenderPlan, SyncEffect, SyncEvent, SyncState};
pub use synchronizer::PreviewSynchronizer;
