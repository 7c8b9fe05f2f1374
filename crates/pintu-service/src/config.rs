//! Service configuration.
//!
//! ```toml
//! bucket = "pintu-images"
//! max_sources = 50
//!
//! [pipeline.compression]
//! threshold_bytes = 4718592
//! ```

use std::path::Path;

use pintu_core::{ConfigError, PipelineConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServiceConfig {
    /// Object-store bucket holding uploads and exports.
    pub bucket: String,
    /// Path prefix for uploaded files.
    pub upload_prefix: String,
    /// Path prefix for stitched results.
    pub export_prefix: String,
    /// Most sources one stitch request may name.
    pub max_sources: usize,
    /// Upper bound on the summed pixel count of all probed sources, and on
    /// the area of the stitched canvas.
    pub max_total_pixels: u64,
    /// Timeout for URL sources.
    pub fetch_timeout_secs: u64,
    /// Largest body accepted from a URL source.
    pub max_fetch_bytes: u64,
    pub pipeline: PipelineConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bucket: "pintu-images".to_string(),
            upload_prefix: "uploads".to_string(),
            export_prefix: "exports".to_string(),
            max_sources: 50,
            max_total_pixels: 100_000_000,
            fetch_timeout_secs: 30,
            max_fetch_bytes: 50 * 1024 * 1024,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!(
                "No service config found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        log::info!("Loading service config from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "bucket must not be empty".to_string(),
            ));
        }
        for (name, prefix) in [
            ("upload_prefix", &self.upload_prefix),
            ("export_prefix", &self.export_prefix),
        ] {
            if prefix.is_empty() || prefix.starts_with('/') || prefix.ends_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be a non-empty relative path without surrounding slashes, got {prefix:?}"
                )));
            }
        }
        if self.max_sources == 0 {
            return Err(ConfigError::ValidationError(
                "max_sources must be at least 1".to_string(),
            ));
        }
        if self.max_total_pixels == 0 {
            return Err(ConfigError::ValidationError(
                "max_total_pixels must be non-zero".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 || self.max_fetch_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "fetch_timeout_secs and max_fetch_bytes must be non-zero".to_string(),
            ));
        }
        self.pipeline.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_sources, 50);
        assert_eq!(config.max_total_pixels, 100_000_000);
        assert_eq!(config.upload_prefix, "uploads");
        assert_eq!(config.export_prefix, "exports");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_pipeline_override() {
        let config = ServiceConfig::from_toml(
            r#"
            bucket = "collages"
            max_sources = 10

            [pipeline.stitch]
            quality = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.bucket, "collages");
        assert_eq!(config.max_sources, 10);
        assert_eq!(config.pipeline.stitch.quality, 90);
        assert_eq!(config.pipeline.compression, Default::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ServiceConfig::from_toml("max_sources = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml("upload_prefix = \"/uploads\""),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml("[pipeline.stitch]\nquality = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            ServiceConfig::from_toml("unknown = 1"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = ServiceConfig::load_from(Path::new("/nonexistent/pintu.toml")).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }
}
