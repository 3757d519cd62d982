//! Push channel (simulated push service).

use async_trait::async_trait;

use super::strategy::ChannelStrategy;
use crate::error::{AppError, AppResult};
use crate::models::{DeliveryOutcome, Notification, PushConfig};

/// Push notification strategy
#[derive(Debug, Clone)]
pub struct PushStrategy {
    config: PushConfig,
}

impl PushStrategy {
    pub fn new(config: PushConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ChannelStrategy for PushStrategy {
    async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome> {
        tracing::info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            service = %self.config.service,
            title = %notification.title,
            "Push notification sent"
        );
        Ok(DeliveryOutcome::Delivered)
    }

    fn name(&self) -> &str {
        "push"
    }

    async fn validate_config(&self) -> AppResult<()> {
        if self.config.service.trim().is_empty() {
            return Err(AppError::validation("service", "Push service cannot be empty"));
        }
        Ok(())
    }
}
