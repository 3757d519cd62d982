//! Channel kinds and the typed configuration each built-in channel accepts.
//!
//! Channel configuration travels through the factory as a JSON value so that
//! runtime-registered channels can define their own shape. The built-in
//! channels parse it into the structs below.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

// ============================================================================
// Channel kind
// ============================================================================

/// Delivery medium of a notification.
///
/// The well-known kinds get their own variant; anything registered at runtime
/// is carried as `Custom` with its normalised lowercase name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ChannelKind {
    Email,
    Sms,
    Push,
    Log,
    Webhook,
    Custom(String),
}

impl ChannelKind {
    pub fn as_str(&self) -> &str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Sms => "sms",
            ChannelKind::Push => "push",
            ChannelKind::Log => "log",
            ChannelKind::Webhook => "webhook",
            ChannelKind::Custom(name) => name,
        }
    }
}

impl FromStr for ChannelKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name.is_empty() {
            return Err(AppError::validation("type", "Channel kind cannot be empty"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AppError::validation(
                "type",
                format!(
                    "Invalid channel kind '{}': only letters, digits, '-' and '_' are allowed",
                    s
                ),
            ));
        }

        Ok(match name.as_str() {
            "email" => ChannelKind::Email,
            "sms" => ChannelKind::Sms,
            "push" => ChannelKind::Push,
            "log" => ChannelKind::Log,
            "webhook" => ChannelKind::Webhook,
            _ => ChannelKind::Custom(name),
        })
    }
}

impl TryFrom<String> for ChannelKind {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChannelKind> for String {
    fn from(kind: ChannelKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Built-in channel configuration
// ============================================================================

/// Email channel configuration (simulated SMTP relay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub use_tls: bool,
    #[serde(default = "default_sender")]
    pub from: String,
}

/// SMS channel configuration (simulated gateway)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_provider")]
    pub provider: String,
    #[serde(default)]
    pub sender_id: Option<String>,
}

/// Push channel configuration (simulated push service)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_service")]
    pub service: String,
}

/// Webhook-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_smtp_host() -> String {
    "smtp.example.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_sender() -> String {
    "no-reply@example.com".to_string()
}

fn default_sms_provider() -> String {
    "twilio".to_string()
}

fn default_push_service() -> String {
    "firebase".to_string()
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Parses a channel config value, treating `null` as "all defaults".
fn parse_config<T: serde::de::DeserializeOwned>(config: &JsonValue) -> Result<T, serde_json::Error> {
    match config {
        JsonValue::Null => serde_json::from_value(JsonValue::Object(Default::default())),
        other => serde_json::from_value(other.clone()),
    }
}

impl EmailConfig {
    pub fn from_json(config: &JsonValue) -> Result<Self, serde_json::Error> {
        parse_config(config)
    }
}

impl SmsConfig {
    pub fn from_json(config: &JsonValue) -> Result<Self, serde_json::Error> {
        parse_config(config)
    }
}

impl PushConfig {
    pub fn from_json(config: &JsonValue) -> Result<Self, serde_json::Error> {
        parse_config(config)
    }
}

impl WebhookConfig {
    /// Parse config into typed WebhookConfig; `url` is mandatory.
    pub fn from_json(config: &JsonValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(config.clone())
    }
}
