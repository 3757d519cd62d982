//! Email channel.
//!
//! Delivery is simulated: the message is logged with the SMTP relay it would
//! have been handed to.

use async_trait::async_trait;

use super::strategy::ChannelStrategy;
use crate::error::{AppError, AppResult};
use crate::models::{DeliveryOutcome, EmailConfig, Notification};

/// Email channel strategy
#[derive(Debug, Clone)]
pub struct EmailStrategy {
    config: EmailConfig,
}

impl EmailStrategy {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }
}

#[async_trait]
impl ChannelStrategy for EmailStrategy {
    async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome> {
        tracing::info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            subject = %notification.title,
            smtp_host = %self.config.host,
            smtp_port = self.config.port,
            "Email sent"
        );
        Ok(DeliveryOutcome::Delivered)
    }

    fn name(&self) -> &str {
        "email"
    }

    /// Checks that the relay address and sender are usable
    async fn validate_config(&self) -> AppResult<()> {
        if self.config.host.trim().is_empty() {
            return Err(AppError::validation("host", "SMTP host cannot be empty"));
        }
        if self.config.port == 0 {
            return Err(AppError::validation("port", "SMTP port must be non-zero"));
        }
        if !self.config.from.contains('@') {
            return Err(AppError::validation(
                "from",
                format!("Invalid sender address: {}", self.config.from),
            ));
        }
        Ok(())
    }
}
