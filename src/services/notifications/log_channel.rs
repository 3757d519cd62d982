//! Log-only channel, useful in development and tests.

use async_trait::async_trait;

use super::strategy::ChannelStrategy;
use crate::error::AppResult;
use crate::models::{DeliveryOutcome, Notification};

/// Writes the notification to the application log instead of delivering it
#[derive(Debug, Clone, Default)]
pub struct LogStrategy;

#[async_trait]
impl ChannelStrategy for LogStrategy {
    async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome> {
        tracing::info!(
            notification_id = notification.id,
            user_id = notification.user_id,
            message = %notification.message,
            "Notification logged"
        );
        Ok(DeliveryOutcome::Delivered)
    }

    fn name(&self) -> &str {
        "log"
    }
}
