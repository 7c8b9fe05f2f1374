//! Explicit pipeline configuration.
//!
//! Both stages receive their settings as values; nothing is read from
//! process-wide state. Every field has a default, so an empty TOML document
//! (or no file at all) yields the standard policy:
//!
//! ```toml
//! [compression]
//! threshold_bytes = 4718592
//! first_pass = { max_edge = 2560, quality = 80 }
//! second_pass = { max_edge = 1920, quality = 70 }
//!
//! [stitch]
//! fallback_width = 1080
//! fallback_height = 1920
//! quality = 80
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compress::CompressionPolicy;
use crate::stitch::StitchSettings;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Settings for both pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    pub compression: CompressionPolicy,
    pub stitch: StitchSettings,
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "No pipeline config found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Loading pipeline config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compression
            .validate()
            .map_err(ConfigError::ValidationError)?;

        let stitch = &self.stitch;
        if stitch.fallback_width == 0 || stitch.fallback_height == 0 {
            return Err(ConfigError::ValidationError(
                "stitch.fallback_width and stitch.fallback_height must be non-zero".to_string(),
            ));
        }
        if stitch.missing_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "stitch.missing_dimension must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&stitch.quality) {
            return Err(ConfigError::ValidationError(format!(
                "stitch.quality must be 1-100, got {}",
                stitch.quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::FilterType;

    #[test]
    fn test_empty_document_is_default() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = PipelineConfig::from_toml(
            r#"
            [compression]
            threshold_bytes = 1048576
            second_pass = { max_edge = 1280, quality = 60 }

            [stitch]
            quality = 90
            filter = "bilinear"
            "#,
        )
        .unwrap();

        assert_eq!(config.compression.threshold_bytes, 1_048_576);
        assert_eq!(config.compression.first_pass.max_edge, 2560);
        assert_eq!(config.compression.second_pass.quality, 60);
        assert_eq!(config.stitch.quality, 90);
        assert_eq!(config.stitch.filter, FilterType::Bilinear);
        assert_eq!(config.stitch.fallback_width, 1080);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = PipelineConfig::from_toml("[bucket]\nname = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_invalid_quality_rejected() {
        let result = PipelineConfig::from_toml("[stitch]\nquality = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = PipelineConfig::load_from(Path::new("/nonexistent/pintu.toml")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }
}
