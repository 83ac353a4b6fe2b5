//! Owned tool state.
//!
//! Each tool keeps its inputs in one value and changes it only through
//! `apply(self, event) -> Self`. The value derives everything the view and
//! the preview synchronizer need (placements, render plans, element boxes),
//! so tool behaviour is testable without a UI or a runtime.

pub mod removal;
pub mod watermark;

pub use removal::{ElementBox, RemovalEvent, RemovalSession};
pub use watermark::{export_document, WatermarkEvent, WatermarkSession};
