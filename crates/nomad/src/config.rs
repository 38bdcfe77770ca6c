//! # Game Configuration
//!
//! Loaded once at startup from a TOML file. Every field has a default, so an
//! empty file is a valid config.
//!
//! ```toml
//! title = "nomad"
//! width = 1280
//! height = 720
//! max_framerate = 120
//! max_frames = 600
//! squares = 3
//! speed = 1.0
//! clear_color = [0.6, 0.0, 0.6, 1.0]
//! vertex_shader = "shaders/custom.vert"
//! ```
//!
//! Shader paths are optional; unset stages use the built-in sources.

use std::path::{Path, PathBuf};

use nomad_core::MAX_ENTITIES;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration for the frame loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Window title, passed through to the backend.
    pub title: String,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub max_framerate: u32,
    /// Stop after this many frames (`None` = run until quit).
    pub max_frames: Option<u64>,
    /// Number of squares spawned at startup.
    pub squares: usize,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Clear colour (RGBA).
    pub clear_color: [f32; 4],
    /// Vertex shader source override.
    pub vertex_shader: Option<PathBuf>,
    /// Fragment shader source override.
    pub fragment_shader: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 1280,
            height: 720,
            max_framerate: 120,
            max_frames: None,
            squares: 1,
            speed: 1.0,
            clear_color: [0.6, 0.0, 0.6, 1.0],
            vertex_shader: None,
            fragment_shader: None,
        }
    }
}

impl GameConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`], [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_framerate == 0 {
            return Err(ConfigError::Invalid("max_framerate must be at least 1".to_owned()));
        }
        if self.squares > MAX_ENTITIES {
            return Err(ConfigError::Invalid(format!(
                "squares = {} exceeds the entity capacity of {MAX_ENTITIES}",
                self.squares
            )));
        }
        if !self.speed.is_finite() {
            return Err(ConfigError::Invalid("speed must be finite".to_owned()));
        }
        Ok(())
    }

    /// Viewport aspect ratio.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.max_framerate, 120);
        assert_eq!((config.width, config.height), (1280, 720));
    }

    #[test]
    fn test_partial_override() {
        let config = GameConfig::from_toml_str(
            r#"
            title = "demo"
            squares = 4
            max_frames = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.title, "demo");
        assert_eq!(config.squares, 4);
        assert_eq!(config.max_frames, Some(10));
        assert!((config.speed - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            GameConfig::from_toml_str("max_framerate = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("width = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("squares = 5001"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_syntax_errors_and_unknown_keys() {
        assert!(matches!(
            GameConfig::from_toml_str("width = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("fullscreen = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/nonexistent/nomad.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("nomad.toml"));
    }
}
