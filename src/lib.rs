// Markplace: watermark placement and interactive preview engine

pub mod backend;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod overlay; // Drag / rotate / resize of the locally drawn watermark
pub mod preview; // Debounced, superseding preview renders
pub mod removal;
pub mod session;
pub mod watermark;
