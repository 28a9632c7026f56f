//! Configuration loading and management.
//!
//! [`DocmeterConfig`] can be loaded from TOML, YAML or JSON files, discovered
//! in the directory hierarchy (`docmeter.toml`), or built programmatically.
//! Every field has a default, so partial files are valid.

use crate::{DocmeterError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration.
///
/// # Example
///
/// ```rust
/// use docmeter::core::config::DocmeterConfig;
///
/// let config = DocmeterConfig::default();
/// assert_eq!(config.images.max_width, 2400);
/// assert_eq!(config.quality.words_per_page, 500);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocmeterConfig {
    /// Storage normalization of extracted images
    #[serde(default)]
    pub images: ImageOptimizerConfig,

    /// Web rendition settings used by `convert_to_web_format`
    #[serde(default)]
    pub web: WebImageConfig,

    /// Default options for `enhance_image_quality`
    #[serde(default)]
    pub enhance: EnhanceOptions,

    /// Quality scoring thresholds
    #[serde(default)]
    pub quality: QualityConfig,

    /// Edge length of generated thumbnails
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
}

/// Image optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageOptimizerConfig {
    #[serde(default = "default_max_dimension")]
    pub max_width: u32,

    #[serde(default = "default_max_dimension")]
    pub max_height: u32,

    /// Images smaller than this on both sides are upsampled
    #[serde(default = "default_min_size")]
    pub min_size: u32,

    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    #[serde(default = "default_sharpen_factor")]
    pub sharpen_factor: f32,

    /// Candidates narrower or shorter than this are reported as very small
    #[serde(default = "default_small_image_threshold")]
    pub small_image_threshold: u32,
}

impl Default for ImageOptimizerConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dimension(),
            max_height: default_max_dimension(),
            min_size: default_min_size(),
            jpeg_quality: default_jpeg_quality(),
            sharpen_factor: default_sharpen_factor(),
            small_image_threshold: default_small_image_threshold(),
        }
    }
}

/// Settings for web renditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebImageConfig {
    #[serde(default = "default_web_dimension")]
    pub max_width: u32,

    #[serde(default = "default_web_dimension")]
    pub max_height: u32,

    #[serde(default = "default_web_contrast")]
    pub contrast: f32,

    #[serde(default = "default_web_sharpness")]
    pub sharpness: f32,

    #[serde(default = "default_web_quality")]
    pub jpeg_quality: u8,
}

impl Default for WebImageConfig {
    fn default() -> Self {
        Self {
            max_width: default_web_dimension(),
            max_height: default_web_dimension(),
            contrast: default_web_contrast(),
            sharpness: default_web_sharpness(),
            jpeg_quality: default_web_quality(),
        }
    }
}

/// Switches for `enhance_image_quality`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceOptions {
    #[serde(default = "default_true")]
    pub upscale: bool,

    #[serde(default)]
    pub denoise: bool,

    #[serde(default = "default_true")]
    pub sharpen: bool,

    #[serde(default = "default_true")]
    pub contrast_enhancement: bool,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            upscale: true,
            denoise: false,
            sharpen: true,
            contrast_enhancement: true,
        }
    }
}

/// Thresholds used by the quality scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    /// Words assumed per page when no page markers exist
    #[serde(default = "default_words_per_page")]
    pub words_per_page: usize,

    /// Maximum points removed for corrupted characters
    #[serde(default = "default_corruption_penalty_cap")]
    pub corruption_penalty_cap: f64,

    /// Corruption penalty above which an encoding diagnostic is logged
    #[serde(default = "default_corruption_log_threshold")]
    pub corruption_log_threshold: f64,

    /// Fraction of blank lines above which the layout is penalised
    #[serde(default = "default_blank_line_ratio")]
    pub blank_line_ratio: f64,

    /// Relative deviation from the expected length that is tolerated
    #[serde(default = "default_length_tolerance")]
    pub length_tolerance: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            words_per_page: default_words_per_page(),
            corruption_penalty_cap: default_corruption_penalty_cap(),
            corruption_log_threshold: default_corruption_log_threshold(),
            blank_line_ratio: default_blank_line_ratio(),
            length_tolerance: default_length_tolerance(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_thumbnail_size() -> u32 {
    200
}

fn default_max_dimension() -> u32 {
    2400
}

fn default_min_size() -> u32 {
    300
}

fn default_jpeg_quality() -> u8 {
    92
}

fn default_sharpen_factor() -> f32 {
    1.2
}

fn default_small_image_threshold() -> u32 {
    50
}

fn default_web_dimension() -> u32 {
    1600
}

fn default_web_contrast() -> f32 {
    1.1
}

fn default_web_sharpness() -> f32 {
    1.3
}

fn default_web_quality() -> u8 {
    90
}

fn default_words_per_page() -> usize {
    500
}

fn default_corruption_penalty_cap() -> f64 {
    50.0
}

fn default_corruption_log_threshold() -> f64 {
    10.0
}

fn default_blank_line_ratio() -> f64 {
    0.5
}

fn default_length_tolerance() -> f64 {
    0.3
}

impl DocmeterConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocmeterError::Validation` if the file cannot be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        toml::from_str(&content)
            .map_err(|e| DocmeterError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| DocmeterError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        serde_json::from_str(&content)
            .map_err(|e| DocmeterError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DocmeterError::validation(format!(
                "Unsupported config file format: {}",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `docmeter.toml` in the current directory and its ancestors.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocmeterError::Io)?;

        loop {
            let candidate = current.join("docmeter.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        let images = &self.images;
        if images.max_width == 0 || images.max_height == 0 {
            return Err(DocmeterError::validation("images.max_width and images.max_height must be positive"));
        }
        if images.min_size == 0 || images.min_size >= images.max_width.min(images.max_height) {
            return Err(DocmeterError::validation(format!(
                "images.min_size ({}) must be positive and below the maximum bounds",
                images.min_size
            )));
        }
        if self.web.max_width == 0 || self.web.max_height == 0 {
            return Err(DocmeterError::validation("web.max_width and web.max_height must be positive"));
        }
        for (field, quality) in [
            ("images.jpeg_quality", images.jpeg_quality),
            ("web.jpeg_quality", self.web.jpeg_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(DocmeterError::validation(format!(
                    "{} must be between 1 and 100, got {}",
                    field, quality
                )));
            }
        }
        if self.quality.words_per_page == 0 {
            return Err(DocmeterError::validation("quality.words_per_page must be positive"));
        }
        if self.thumbnail_size == 0 {
            return Err(DocmeterError::validation("thumbnail_size must be positive"));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocmeterError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = DocmeterConfig::default();
        assert_eq!(config.images.max_height, 2400);
        assert_eq!(config.images.min_size, 300);
        assert_eq!(config.images.jpeg_quality, 92);
        assert_eq!(config.web.jpeg_quality, 90);
        assert!(config.enhance.upscale);
        assert!(!config.enhance.denoise);
        assert_eq!(config.thumbnail_size, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file_partial() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docmeter.toml");

        fs::write(
            &config_path,
            r#"
[images]
max_width = 1200
jpeg_quality = 80

[enhance]
denoise = true
        "#,
        )
        .unwrap();

        let config = DocmeterConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.images.max_width, 1200);
        assert_eq!(config.images.max_height, 2400);
        assert_eq!(config.images.jpeg_quality, 80);
        assert!(config.enhance.denoise);
        assert!(config.enhance.sharpen);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docmeter.yaml");
        fs::write(&config_path, "quality:\n  words_per_page: 250\n").unwrap();

        let config = DocmeterConfig::from_file(&config_path).unwrap();
        assert_eq!(config.quality.words_per_page, 250);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docmeter.json");
        fs::write(&config_path, r#"{"thumbnail_size": 128}"#).unwrap();

        let config = DocmeterConfig::from_file(&config_path).unwrap();
        assert_eq!(config.thumbnail_size, 128);
    }

    #[test]
    fn test_invalid_toml_is_validation_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "images = [").unwrap();

        let err = DocmeterConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, DocmeterError::Validation { .. }));
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        let err = DocmeterConfig::from_toml_file("/nonexistent/docmeter.toml").unwrap_err();
        assert!(matches!(err, DocmeterError::Validation { .. }));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = DocmeterConfig::from_file("settings.ini").unwrap_err();
        assert!(err.to_string().contains("Unsupported config file format"));
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let mut config = DocmeterConfig::default();
        config.images.jpeg_quality = 0;
        assert!(config.validate().is_err());

        let mut config = DocmeterConfig::default();
        config.web.jpeg_quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_min_size_above_bounds() {
        let mut config = DocmeterConfig::default();
        config.images.min_size = 3000;
        assert!(config.validate().is_err());
    }
}
