//! Domain error types

use thiserror::Error;

/// Error when a slot number is outside the ring
#[derive(Debug, Clone, Error)]
#[error("Invalid slot: \"{input}\". Valid slots are 1, 2 and 3")]
pub struct InvalidSlotError {
    pub input: String,
}

/// Error when an unknown effect key is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid effect: \"{input}\". Valid effects are: music1, music2, music3")]
pub struct InvalidEffectError {
    pub input: String,
}

/// Error when an unknown quality preset is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid quality: \"{input}\". Valid presets are: high, low")]
pub struct InvalidQualityError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
