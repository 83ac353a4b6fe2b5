//! Preview debounce settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REMOVAL_DEBOUNCE_MS, DEFAULT_WATERMARK_DEBOUNCE_MS};

fn default_watermark_debounce_ms() -> u64 {
    DEFAULT_WATERMARK_DEBOUNCE_MS
}

fn default_removal_debounce_ms() -> u64 {
    DEFAULT_REMOVAL_DEBOUNCE_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Quiet period for the add-watermark tool (default: 300ms)
    #[serde(default = "default_watermark_debounce_ms")]
    pub watermark_debounce_ms: u64,

    /// Quiet period for the remove-watermark tool (default: 200ms)
    #[serde(default = "default_removal_debounce_ms")]
    pub removal_debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            watermark_debounce_ms: default_watermark_debounce_ms(),
            removal_debounce_ms: default_removal_debounce_ms(),
        }
    }
}

impl PreviewConfig {
    pub fn watermark_debounce(&self) -> Duration {
        Duration::from_millis(self.watermark_debounce_ms)
    }

    pub fn removal_debounce(&self) -> Duration {
        Duration::from_millis(self.removal_debounce_ms)
    }
}
