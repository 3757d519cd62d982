//! Errors raised while loading and checking configuration

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `default.toml` or the `--config` file is missing
    #[error("Required configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Sources merged but did not deserialize into `Settings`
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A value deserialized but is outside what the service accepts
    #[error("Invalid value for '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error(
        "Unknown environment '{value}', expected one of: development, test, staging, production"
    )]
    UnknownEnvironment { value: String },

    #[error(
        "HERALD_CONFIG_DIR and HERALD_CONFIG_FILE cannot both be set; \
         use the directory for layered loading or the file for a single source"
    )]
    ConflictingSources,

    #[error(transparent)]
    Source(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        ConfigError::FileNotFound { path: path.into() }
    }

    /// Dotted key the error refers to, when there is one
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            ConfigError::UnknownEnvironment { .. } => Some("HERALD_APP_ENV"),
            _ => None,
        }
    }
}
