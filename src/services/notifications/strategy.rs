//! Channel strategy trait.
//!
//! This module provides the uniform delivery contract every channel kind
//! implements, allowing new channels to be plugged in through the factory.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{DeliveryOutcome, Notification};

/// Delivery strategy for one channel kind (email, SMS, push, ...)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// Strategies are shared through `Arc` by the factory cache, so they must be
/// `Send + Sync` and must not keep per-attempt state.
///
/// # Example Implementation
/// ```ignore
/// use async_trait::async_trait;
///
/// pub struct SlackStrategy {
///     workspace: String,
/// }
///
/// #[async_trait]
/// impl ChannelStrategy for SlackStrategy {
///     async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome> {
///         // Implementation here
///     }
///
///     fn name(&self) -> &str {
///         "slack"
///     }
/// }
/// ```
#[async_trait]
pub trait ChannelStrategy: Send + Sync {
    /// Attempts delivery of one notification
    ///
    /// Every call is a fresh attempt. A transport-level rejection is reported
    /// as `DeliveryOutcome::Failed`; an `Err` means the strategy itself could
    /// not run. The dispatcher records both as a failed attempt.
    async fn send(&self, notification: &Notification) -> AppResult<DeliveryOutcome>;

    /// Channel kind name for logging
    fn name(&self) -> &str;

    /// Validates the configuration the strategy was built with (default no-op)
    async fn validate_config(&self) -> AppResult<()> {
        Ok(())
    }
}
