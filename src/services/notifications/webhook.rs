//! Webhook channel implementation.
//!
//! Posts the notification as JSON to a configured URL. This is the only
//! built-in channel with a real transport.

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::json;
use std::time::{Duration, Instant};

use super::strategy::ChannelStrategy;
use crate::error::{AppError, AppResult};
use crate::models::{DeliveryOutcome, Notification, WebhookConfig};

/// Webhook channel strategy
///
/// Each instance owns a client whose request timeout is the configured
/// `timeout_seconds`. Instances are cached per configuration by the factory,
/// so connections are pooled per endpoint.
///
/// # Example
/// ```ignore
/// let config = WebhookConfig {
///     url: "https://example.com/hooks/notify".to_string(),
///     method: "POST".to_string(),
///     headers: BTreeMap::new(),
///     timeout_seconds: 10,
/// };
/// let strategy = WebhookStrategy::new(config)?;
/// let outcome = strategy.send(&notification).await?;
/// ```
pub struct WebhookStrategy {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookStrategy {
    /// Creates a new webhook strategy and its HTTP client
    ///
    /// # Errors
    /// * `Validation` when `timeout_seconds` is zero
    /// * `Configuration` when the client cannot be built
    pub fn new(config: WebhookConfig) -> AppResult<Self> {
        if config.timeout_seconds == 0 {
            return Err(AppError::validation(
                "timeout_seconds",
                "Timeout must be at least one second",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(10)))
            .pool_idle_timeout(Duration::from_secs(90))
            .gzip(true)
            .user_agent(concat!("herald-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration {
                key: "notifications.channels.webhook".to_string(),
                source: anyhow::Error::from(e),
            })?;

        Ok(Self { config, client })
    }

    /// Parses HTTP method string into reqwest Method
    fn parse_method(&self) -> Result<Method, AppError> {
        self.config
            .method
            .to_uppercase()
            .parse()
            .map_err(|_| AppError::validation("method", format!("Invalid HTTP method: {}", self.config.method)))
    }
}

#[async_trait]
impl ChannelStrategy for WebhookStrategy {
    /// Sends the notification as a JSON body
    ///
    /// Non-2xx responses and transport errors are failed outcomes, not errors.
    async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome> {
        let start = Instant::now();

        let method = self.parse_method()?;
        let mut request = self.client.request(method, &self.config.url).json(&json!({
            "id": notification.id,
            "user_id": notification.user_id,
            "channel": notification.channel,
            "title": notification.title,
            "message": notification.message,
            "attempt": notification.attempts,
        }));

        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let outcome = match request.send().await {
            Ok(resp) if resp.status().is_success() => DeliveryOutcome::Delivered,
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                DeliveryOutcome::Failed(format!(
                    "webhook responded with {}: {}",
                    status,
                    truncate(&body, 200)
                ))
            }
            Err(e) => DeliveryOutcome::Failed(format!("webhook request failed: {}", e)),
        };

        tracing::debug!(
            notification_id = notification.id,
            url = %self.config.url,
            delivered = outcome.is_delivered(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Webhook call finished"
        );
        Ok(outcome)
    }

    fn name(&self) -> &str {
        "webhook"
    }

    /// Validates webhook configuration
    ///
    /// Checks that:
    /// - URL parses and uses HTTPS
    /// - HTTP method is valid
    async fn validate_config(&self) -> AppResult<()> {
        let url = Url::parse(&self.config.url)
            .map_err(|_| AppError::validation("url", "Invalid URL format"))?;

        if url.scheme() != "https" {
            return Err(AppError::validation("url", "Only HTTPS URLs are allowed"));
        }

        self.parse_method()?;
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelKind, NotificationStatus};
    use jiff::Timestamp;
    use std::collections::BTreeMap;

    fn config(url: &str, method: &str) -> WebhookConfig {
        WebhookConfig {
            url: url.to_string(),
            method: method.to_string(),
            headers: BTreeMap::new(),
            timeout_seconds: 2,
        }
    }

    fn notification() -> Notification {
        let now = Timestamp::now();
        Notification {
            id: 9,
            user_id: 3,
            channel: ChannelKind::Webhook,
            title: "t".to_string(),
            message: "m".to_string(),
            status: NotificationStatus::Pending,
            attempts: 1,
            last_error: None,
            created_at: now,
            updated_at: now,
            sent_at: None,
        }
    }

    #[tokio::test]
    async fn test_validate_config() {
        let ok = WebhookStrategy::new(config("https://hooks.example.com/a", "post")).unwrap();
        assert!(ok.validate_config().await.is_ok());

        let http = WebhookStrategy::new(config("http://hooks.example.com/a", "POST")).unwrap();
        assert!(matches!(
            http.validate_config().await,
            Err(AppError::Validation { .. })
        ));

        let garbage = WebhookStrategy::new(config("not a url", "POST")).unwrap();
        assert!(garbage.validate_config().await.is_err());

        let method = WebhookStrategy::new(config("https://hooks.example.com/a", "PO ST")).unwrap();
        match method.validate_config().await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "method"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_is_rejected_on_construction() {
        let mut zero = config("https://hooks.example.com/a", "POST");
        zero.timeout_seconds = 0;
        match WebhookStrategy::new(zero) {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "timeout_seconds"),
            Err(other) => panic!("Expected Validation error, got {:?}", other),
            Ok(_) => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_failed_outcome() {
        let strategy = WebhookStrategy::new(config("http://127.0.0.1:1/hook", "POST")).unwrap();
        let outcome = strategy.send(&notification()).await.unwrap();
        match outcome {
            DeliveryOutcome::Failed(reason) => assert!(reason.contains("webhook request failed")),
            DeliveryOutcome::Delivered => panic!("Expected failed outcome"),
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
