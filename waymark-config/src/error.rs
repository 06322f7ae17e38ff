// Error types for option loading

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}: {reason}")]
    LoadError { path: String, reason: String },

    #[error("Failed to parse {format} configuration: {message}")]
    ParseError { format: &'static str, message: String },

    #[error("Invalid value for '{field}': {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Unknown configuration key '{key}' in section '{section}'")]
    UnknownKey { section: String, key: String },

    #[error("Configuration does not match the options shape: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
