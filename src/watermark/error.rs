//! Watermark error types.
//!
//! Defines errors that can occur while validating a watermark recipe or
//! deriving placements from it.

use std::fmt;

/// Errors that can occur during watermark planning.
#[derive(Debug, Clone, PartialEq)]
pub enum WatermarkError {
    /// The recipe failed validation
    InvalidSpec(String),

    /// Page geometry (or another prerequisite) is not available yet
    NotReady(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpec(msg) => write!(f, "Invalid watermark spec: {}", msg),
            Self::NotReady(msg) => write!(f, "Watermark not ready: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
