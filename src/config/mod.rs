//! Toolkit Configuration
//!
//! Loaded from RON or JSON (picked by file extension). Every field has a
//! default, so partial files are fine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::groups::GroupWidth;
use crate::logging::TracingConfig;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config extension: {0}")]
    UnsupportedExtension(String),
    #[error("Unsupported group bit count {0} (expected 128 or 256)")]
    GroupBitCount(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    pub allow_repeated_names: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSettings {
    /// Interpret rotation arguments as radians
    pub radians: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Width of draw/display/navmesh group fields for new entries
    pub group_bit_count: u32,
    pub merge: MergeSettings,
    pub transform: TransformSettings,
    pub logging: TracingConfig,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            group_bit_count: 128,
            merge: MergeSettings::default(),
            transform: TransformSettings::default(),
            logging: TracingConfig::default(),
        }
    }
}

impl ToolkitConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match extension.as_str() {
            "ron" => Self::from_ron_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(ConfigError::UnsupportedExtension(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "Loaded toolkit config");
        Ok(config)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.group_width().map(|_| ())
    }

    pub fn group_width(&self) -> Result<GroupWidth, ConfigError> {
        GroupWidth::from_bit_count(self.group_bit_count)
            .ok_or(ConfigError::GroupBitCount(self.group_bit_count))
    }
}
