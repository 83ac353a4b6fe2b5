// Configuration module
//
// Loads `markplace.yaml`: rendering engine connection, preview timings,
// log output and the default watermark recipe. Every section is optional.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod logging;
pub mod preview;
pub mod renderer;

pub use logging::{LogFormat, LoggingConfig};
pub use preview::PreviewConfig;
pub use renderer::RendererConfig;

use crate::error::Error;
use crate::watermark::WatermarkSpec;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub renderer: RendererConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Recipe used when no spec file is given
    #[serde(default)]
    pub watermark: WatermarkSpec,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }

    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        let substituted = substitute_env(yaml)?;
        Self::from_yaml(&substituted)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Load `path` if it exists, otherwise use defaults.
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load `path` (or defaults when it does not exist) and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::error::Result<Self> {
        let config = Self::from_optional_file(path).map_err(Error::Config)?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.renderer.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err("logging.level cannot be empty".to_string());
        }
        tracing_subscriber::EnvFilter::try_new(&self.logging.level)
            .map_err(|e| format!("logging.level '{}' is invalid: {}", self.logging.level, e))?;

        self.watermark
            .validate()
            .map_err(|e| format!("watermark: {}", e))?;

        Ok(())
    }
}

/// Replace `${VAR_NAME}` with environment variable values. Every referenced
/// variable must be set.
pub fn substitute_env(yaml: &str) -> Result<String, String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

    for caps in re.captures_iter(yaml) {
        let var_name = &caps[1];
        std::env::var(var_name).map_err(|_| {
            format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            )
        })?;
    }

    Ok(re
        .replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned())
}
