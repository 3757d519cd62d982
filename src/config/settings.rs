//! Configuration settings structures for herald-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "herald-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_store_path() -> String {
    "data/notifications.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/herald.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_channels() -> Vec<String> {
    vec!["email".to_string()]
}

fn default_sweep_cron() -> String {
    // every five minutes, seconds field first
    "0 */5 * * * *".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds a request may run before it is answered with 408
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

// ============================================================================
// Store Configuration
// ============================================================================

/// Notification store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file path
    #[serde(default = "default_store_path")]
    pub path: String,

    /// Whether records are mirrored to the snapshot file
    #[serde(default)]
    pub persist: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            persist: false,
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime `LoggerConfig`
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level).map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: e.to_string(),
        })
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })?;

        Ok(FileConfig {
            enabled: self.enabled,
            path: PathBuf::from(self.path),
            append: self.append,
            format,
        })
    }
}

// ============================================================================
// Notifications Configuration
// ============================================================================

/// Delivery policy and per-channel settings
///
/// ```toml
/// [notifications]
/// max_retries = 3
/// default_channels = ["email"]
///
/// [notifications.event_channels]
/// product_price_changed = ["push"]
///
/// [notifications.user_channels]
/// "42" = ["sms", "email"]
///
/// [notifications.channels.webhook]
/// url = "https://hooks.example.com/notify"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Attempts allowed per notification before it is permanently FAILED
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Channels used when neither a user nor an event override applies
    #[serde(default = "default_channels")]
    pub default_channels: Vec<String>,

    /// Channels per event name
    #[serde(default)]
    pub event_channels: BTreeMap<String, Vec<String>>,

    /// Channels per user id (TOML keys are strings)
    #[serde(default)]
    pub user_channels: BTreeMap<String, Vec<String>>,

    /// Configuration handed to the channel factory, keyed by channel kind
    #[serde(default)]
    pub channels: BTreeMap<String, JsonValue>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            default_channels: default_channels(),
            event_channels: BTreeMap::new(),
            user_channels: BTreeMap::new(),
            channels: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Jobs Configuration
// ============================================================================

/// Periodic `retry_failed` sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySweepConfig {
    /// Whether the sweep is scheduled at all
    #[serde(default)]
    pub enabled: bool,

    /// Six-field cron expression (sec min hour day month weekday)
    #[serde(default = "default_sweep_cron")]
    pub cron: String,
}

impl Default for RetrySweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron: default_sweep_cron(),
        }
    }
}

/// Background job configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct JobsConfig {
    #[serde(default)]
    pub retry_sweep: RetrySweepConfig,
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Notification store
    #[serde(default)]
    pub store: StoreConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Delivery policy
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Job scheduling configuration
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    // ========================================================================
    // Arbitrary implementations for property-based testing
    // ========================================================================

    fn arb_application_config() -> impl Strategy<Value = ApplicationConfig> {
        (
            "[a-z][a-z0-9-]{0,20}",                 // name: valid app name
            "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}", // version: semver-like
        )
            .prop_map(|(name, version)| ApplicationConfig { name, version })
    }

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("0.0.0.0".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            1u64..=300u64,
        )
            .prop_map(|(host, port, request_timeout)| ServerConfig {
                host,
                port,
                request_timeout,
            })
    }

    fn arb_store_config() -> impl Strategy<Value = StoreConfig> {
        (
            prop_oneof![
                Just("data/notifications.json".to_string()),
                Just("/var/lib/herald/store.json".to_string()),
            ],
            any::<bool>(),
        )
            .prop_map(|(path, persist)| StoreConfig { path, persist })
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            (any::<bool>(), any::<bool>()),
            (
                any::<bool>(),
                prop_oneof![
                    Just("logs/herald.log".to_string()),
                    Just("/var/log/herald.log".to_string()),
                ],
                any::<bool>(),
                prop_oneof![
                    Just("json".to_string()),
                    Just("full".to_string()),
                    Just("compact".to_string()),
                ],
            ),
        )
            .prop_map(
                |(level, (enabled, colored), (file_enabled, path, append, format))| {
                    LoggerSettings {
                        level,
                        console: ConsoleSettings { enabled, colored },
                        file: FileSettings {
                            enabled: file_enabled,
                            path,
                            append,
                            format,
                        },
                    }
                },
            )
    }

    fn arb_channel_list() -> impl Strategy<Value = Vec<String>> {
        proptest::sample::subsequence(vec!["email", "sms", "push", "log", "webhook"], 1..=3)
            .prop_map(|kinds| kinds.into_iter().map(String::from).collect())
    }

    fn arb_notifications_config() -> impl Strategy<Value = NotificationsConfig> {
        (
            1u32..=10u32,
            arb_channel_list(),
            proptest::collection::btree_map(
                prop_oneof![
                    Just("favorite_added".to_string()),
                    Just("product_price_changed".to_string()),
                    Just("product_back_in_stock".to_string()),
                ],
                arb_channel_list(),
                0..=3,
            ),
            proptest::collection::btree_map("[1-9][0-9]{0,4}", arb_channel_list(), 0..=3),
            1u64..=60u64,
        )
            .prop_map(
                |(max_retries, default_channels, event_channels, user_channels, timeout)| {
                    let mut channels = BTreeMap::new();
                    channels.insert(
                        "webhook".to_string(),
                        json!({"url": "https://hooks.example.com/n", "timeout_seconds": timeout}),
                    );
                    NotificationsConfig {
                        max_retries,
                        default_channels,
                        event_channels,
                        user_channels,
                        channels,
                    }
                },
            )
    }

    fn arb_jobs_config() -> impl Strategy<Value = JobsConfig> {
        (
            any::<bool>(),
            prop_oneof![
                Just("0 */5 * * * *".to_string()),
                Just("0 0 * * * *".to_string()),
            ],
        )
            .prop_map(|(enabled, cron)| JobsConfig {
                retry_sweep: RetrySweepConfig { enabled, cron },
            })
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_application_config(),
            arb_server_config(),
            arb_store_config(),
            arb_logger_settings(),
            arb_notifications_config(),
            arb_jobs_config(),
        )
            .prop_map(
                |(application, server, store, logger, notifications, jobs)| Settings {
                    application,
                    server,
                    store,
                    logger,
                    notifications,
                    jobs,
                },
            )
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any valid Settings to TOML and back yields the same value.
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");

            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");

            prop_assert_eq!(settings, deserialized);
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_application_config_defaults() {
        let config = ApplicationConfig::default();
        assert_eq!(config.name, "herald-rs");
        assert_eq!(config.version, crate::pkg_version());
    }

    #[test]
    fn test_server_config_address() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_store_config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.path, "data/notifications.json");
        assert!(!config.persist);
    }

    #[test]
    fn test_notifications_config_defaults() {
        let config = NotificationsConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.default_channels, vec!["email"]);
        assert!(config.event_channels.is_empty());
        assert!(config.channels.is_empty());
    }

    #[test]
    fn test_retry_sweep_disabled_by_default() {
        let config = JobsConfig::default();
        assert!(!config.retry_sweep.enabled);
        assert_eq!(config.retry_sweep.cron, "0 */5 * * * *");
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml_str = r#"
[server]
port = 8080

[notifications]
max_retries = 5
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.notifications.max_retries, 5);
        assert_eq!(settings.notifications.default_channels, vec!["email"]);
        assert_eq!(settings.logger, LoggerSettings::default());
    }

    #[test]
    fn test_settings_deserialize_channel_tables() {
        let toml_str = r#"
[notifications]
default_channels = ["email", "push"]

[notifications.event_channels]
product_back_in_stock = ["sms"]

[notifications.user_channels]
"42" = ["log"]

[notifications.channels.email]
host = "smtp.internal"
port = 2525

[notifications.channels.webhook]
url = "https://hooks.example.com/notify"
headers = { Authorization = "Bearer abc" }
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        let n = &settings.notifications;
        assert_eq!(n.default_channels, vec!["email", "push"]);
        assert_eq!(n.event_channels["product_back_in_stock"], vec!["sms"]);
        assert_eq!(n.user_channels["42"], vec!["log"]);
        assert_eq!(n.channels["email"]["port"], json!(2525));
        assert_eq!(
            n.channels["webhook"]["headers"]["Authorization"],
            json!("Bearer abc")
        );
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings {
                enabled: true,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path: "logs/test.log".to_string(),
                append: false,
                format: "compact".to_string(),
            },
        };

        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.level, "debug");
        assert!(!config.console.colored);
        assert!(config.file.enabled);
        assert_eq!(config.file.path, PathBuf::from("logs/test.log"));
        assert_eq!(config.file.format, LogFormat::Compact);
    }

    #[test]
    fn test_file_settings_invalid_format() {
        let settings = FileSettings {
            format: "xml".to_string(),
            ..Default::default()
        };
        match settings.into_file_config() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "logger.file.format")
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_logger_settings_both_outputs_disabled() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        assert!(settings.into_logger_config().is_err());
    }
}
