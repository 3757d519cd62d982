//! Errors raised while building the tracing subscriber

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    /// Log directory or file could not be opened
    #[error("Log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid logger configuration: {message}")]
    Config { message: String },

    #[error("Unknown log level '{value}', expected trace, debug, info, warn or error")]
    UnknownLevel { value: String },

    #[error("Unknown log format '{value}', expected full, compact or json")]
    UnknownFormat { value: String },
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
