//! # Game Error Types

use std::path::PathBuf;

use nomad_core::EcsError;
use thiserror::Error;

/// Errors raised while loading or validating a [`GameConfig`](crate::GameConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur while running the game.
#[derive(Error, Debug)]
pub enum GameError {
    /// An ECS call was rejected.
    #[error("ecs: {0}")]
    Ecs(#[from] EcsError),

    /// The configuration could not be loaded.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// A shader source file could not be read.
    #[error("cannot read shader {path}: {source}")]
    Shader {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The render backend failed.
    #[error("render backend: {0}")]
    Backend(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
