//! Configuration Error Types
//!
//! Error handling for configuration loading and validation with messages
//! that point at the offending field or file.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Layered sources could not be read or merged
    #[error("Failed to load configuration from '{source_description}': {error}")]
    LoadError {
        source_description: String,
        error: String,
    },

    /// Merged configuration does not fit the expected shape
    #[error("Failed to deserialize configuration: {0}")]
    DeserializationError(String),

    /// Missing required configuration field
    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// Configured directory is unusable
    #[error("Configuration directory '{path}' is not accessible: {error}")]
    DirectoryError { path: PathBuf, error: String },
}

impl ConfigurationError {
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(error: config::ConfigError) -> Self {
        match error {
            config::ConfigError::Foreign(inner) => Self::LoadError {
                source_description: "layered sources".to_string(),
                error: inner.to_string(),
            },
            other => Self::DeserializationError(other.to_string()),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
