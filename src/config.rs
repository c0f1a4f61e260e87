//! Configuration management for MarsPlay
//!
//! Defaults mirror the compiled-in constants. A TOML file and `MARSPLAY_*`
//! environment variables may override them, e.g.
//! `MARSPLAY_CAMERA__JPEG_QUALITY=85`.

use crate::constants::{
    DEFAULT_JPEG_QUALITY, DEFAULT_PICTURE_HEIGHT, DEFAULT_PICTURE_WIDTH,
    DISPLAY_ROTATION_DEGREES, MEDIA_DIRECTORY_NAME,
};
use crate::errors::CameraError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarsPlayConfig {
    pub camera: CameraConfig,
    pub storage: StorageConfig,
}

/// Camera-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Still picture size [width, height]
    pub picture_size: [u32; 2],
    /// JPEG quality (0-100)
    pub jpeg_quality: u8,
    /// Preview rotation in degrees
    pub display_rotation: u32,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the host's public pictures directory
    pub pictures_directory: Option<PathBuf>,
    /// Folder created under the pictures directory
    pub media_folder: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            picture_size: [DEFAULT_PICTURE_WIDTH, DEFAULT_PICTURE_HEIGHT],
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            display_rotation: DISPLAY_ROTATION_DEGREES,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pictures_directory: None,
            media_folder: MEDIA_DIRECTORY_NAME.to_string(),
        }
    }
}

impl MarsPlayConfig {
    /// Load configuration from a TOML file, layered with environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
        }

        let config = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("MARSPLAY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: MarsPlayConfig = config.try_deserialize()?;
        config.validate().map_err(CameraError::ConfigError)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            CameraError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string)?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("marsplay.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let [width, height] = self.camera.picture_size;
        if width == 0 || height == 0 {
            return Err("Invalid picture size".to_string());
        }
        if self.camera.jpeg_quality > 100 {
            return Err("JPEG quality must be between 0 and 100".to_string());
        }
        if self.camera.display_rotation % 90 != 0 || self.camera.display_rotation >= 360 {
            return Err("Display rotation must be one of 0, 90, 180, 270".to_string());
        }
        if self.storage.media_folder.trim().is_empty() {
            return Err("Media folder name must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MarsPlayConfig::default();
        assert_eq!(config.camera.picture_size, [1280, 720]);
        assert_eq!(config.camera.jpeg_quality, 100);
        assert_eq!(config.camera.display_rotation, 90);
        assert_eq!(config.storage.media_folder, "MarsPlay");
        assert!(config.storage.pictures_directory.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = MarsPlayConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_size = config.clone();
        bad_size.camera.picture_size = [0, 720];
        assert!(bad_size.validate().is_err());

        let mut bad_quality = MarsPlayConfig::default();
        bad_quality.camera.jpeg_quality = 101;
        assert!(bad_quality.validate().is_err());

        let mut bad_rotation = MarsPlayConfig::default();
        bad_rotation.camera.display_rotation = 45;
        assert!(bad_rotation.validate().is_err());

        let mut zero_quality = MarsPlayConfig::default();
        zero_quality.camera.jpeg_quality = 0;
        assert!(zero_quality.validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested").join("marsplay.toml");

        let mut config = MarsPlayConfig::default();
        config.camera.jpeg_quality = 80;
        config.storage.pictures_directory = Some(PathBuf::from("/tmp/pictures"));
        config.save_to_file(&config_path).unwrap();

        let loaded = MarsPlayConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.camera.jpeg_quality, 80);
        assert_eq!(
            loaded.storage.pictures_directory,
            Some(PathBuf::from("/tmp/pictures"))
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("marsplay.toml");
        fs::write(&config_path, "[camera]\njpeg_quality = 42\n").unwrap();

        let loaded = MarsPlayConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.camera.jpeg_quality, 42);
        assert_eq!(loaded.camera.picture_size, [1280, 720]);
        assert_eq!(loaded.storage.media_folder, "MarsPlay");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("marsplay.toml");
        fs::write(&config_path, "[camera]\ndisplay_rotation = 45\n").unwrap();

        let result = MarsPlayConfig::load_from_file(&config_path);
        assert!(matches!(result, Err(CameraError::ConfigError(_))));
    }

    #[test]
    fn test_config_toml_format() {
        let toml_string = toml::to_string_pretty(&MarsPlayConfig::default()).unwrap();
        assert!(toml_string.contains("[camera]"));
        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("picture_size"));
        assert!(toml_string.contains("media_folder"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MarsPlayConfig::load_from_file(dir.path().join("missing.toml"));
        assert_eq!(result.unwrap().camera.jpeg_quality, 100);
    }
}
