//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    FileSettings, LoggerSettings, NotificationsConfig, RetrySweepConfig, ServerConfig, Settings,
    StoreConfig,
};
use crate::models::ChannelKind;

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Upper bound for `notifications.max_retries`
const MAX_RETRY_CEILING: u32 = 100;

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    /// - Keep-alive timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl StoreConfig {
    /// A persisted store needs somewhere to write.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.persist && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "store.path",
                "Snapshot path is required when persistence is enabled.",
            ));
        }
        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl NotificationsConfig {
    /// Validate the delivery policy
    ///
    /// # Validation Rules
    /// - `max_retries` must be between 1 and 100
    /// - `default_channels` must name at least one channel
    /// - every channel name must be a well-formed kind
    /// - `user_channels` keys must be numeric user ids
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 || self.max_retries > MAX_RETRY_CEILING {
            return Err(ConfigError::ValidationError {
                field: "notifications.max_retries".to_string(),
                message: format!(
                    "Max retries must be between 1 and {}.",
                    MAX_RETRY_CEILING
                ),
            });
        }

        if self.default_channels.is_empty() {
            return Err(ConfigError::validation(
                "notifications.default_channels",
                "At least one default channel is required.",
            ));
        }
        check_kinds("notifications.default_channels", &self.default_channels)?;

        for (event, channels) in &self.event_channels {
            check_kinds(&format!("notifications.event_channels.{}", event), channels)?;
        }

        for (user, channels) in &self.user_channels {
            let field = format!("notifications.user_channels.{}", user);
            if user.trim().parse::<i64>().is_err() {
                return Err(ConfigError::ValidationError {
                    field,
                    message: format!("User key '{}' is not a numeric user id.", user),
                });
            }
            check_kinds(&field, channels)?;
        }

        for kind in self.channels.keys() {
            check_kinds("notifications.channels", std::slice::from_ref(kind))?;
        }

        Ok(())
    }
}

impl RetrySweepConfig {
    /// The cron expression must have six or seven fields (seconds first).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        let fields = self.cron.split_whitespace().count();
        if !(6..=7).contains(&fields) {
            return Err(ConfigError::ValidationError {
                field: "jobs.retry_sweep.cron".to_string(),
                message: format!(
                    "Cron expression '{}' must have 6 or 7 fields (sec min hour day month weekday [year]).",
                    self.cron
                ),
            });
        }
        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.logger.validate()?;
        self.notifications.validate()?;
        self.jobs.retry_sweep.validate()?;
        Ok(())
    }
}

fn check_kinds(field: &str, names: &[String]) -> Result<(), ConfigError> {
    for name in names {
        name.parse::<ChannelKind>()
            .map_err(|_| ConfigError::ValidationError {
                field: field.to_string(),
                message: format!("Invalid channel kind '{}'.", name),
            })?;
    }
    Ok(())
}
