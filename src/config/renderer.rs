//! Rendering engine connection settings.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RENDERER_TIMEOUT_SECS, DEFAULT_RENDERER_URL};

fn default_base_url() -> String {
    DEFAULT_RENDERER_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_RENDERER_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Base URL of the engine; endpoints live under `{base_url}/api/`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<(), String> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err("renderer.base_url cannot be empty".to_string());
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!(
                "renderer.base_url must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if self.timeout_seconds == 0 {
            return Err("renderer.timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}
