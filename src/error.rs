// Error types module

use thiserror::Error;

use crate::backend::BackendError;
use crate::overlay::OverlayError;
use crate::watermark::WatermarkError;

/// Centralized error type for the crate
///
/// Each concern keeps its own error enum; this one wraps them for callers
/// that drive a whole tool flow (load, plan, render, export).
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (invalid YAML, missing env vars, failed validation)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type Result<T> = std::result::Result<T, Error>;
