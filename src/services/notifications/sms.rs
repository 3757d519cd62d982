//! SMS channel (simulated gateway).

use async_trait::async_trait;

use super::strategy::ChannelStrategy;
use crate::error::{AppError, AppResult};
use crate::models::{DeliveryOutcome, Notification, SmsConfig};

/// SMS channel strategy
#[derive(Debug, Clone)]
pub struct SmsStrategy {
    config: SmsConfig,
}

impl SmsStrategy {
    pub fn new(config: SmsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChannelStrategy for SmsStrategy {
    async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome> {
        tracing::info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            provider = %self.config.provider,
            sender_id = self.config.sender_id.as_deref().unwrap_or("-"),
            "SMS sent"
        );
        Ok(DeliveryOutcome::Delivered)
    }

    fn name(&self) -> &str {
        "sms"
    }

    async fn validate_config(&self) -> AppResult<()> {
        if self.config.provider.trim().is_empty() {
            return Err(AppError::validation("provider", "SMS provider cannot be empty"));
        }
        Ok(())
    }
}
