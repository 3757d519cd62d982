//! Notification dispatch service.
//!
//! Reacts to domain events, turns them into notification records, and drives
//! each record through `PENDING -> SENT | FAILED` with bounded retries.

use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use super::factory::ChannelFactory;
use super::policy::ChannelPolicy;
use super::strategy::ChannelStrategy;
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus, EventObserver};
use crate::models::{
    ChannelKind, DeliveryOutcome, NewNotification, Notification, NotificationStatus,
};
use crate::repositories::NotificationRepository;

/// Result of one `retry_failed` sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetryReport {
    /// Records eligible when the sweep started
    pub selected: usize,
    pub sent: usize,
    pub failed: usize,
    /// Records another caller was already delivering
    pub skipped: usize,
}

/// Result of `notify_bulk`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    /// Requests rejected before anything was stored, with their reason
    pub rejected: Vec<String>,
}

/// The observer that delivers notifications
pub struct NotificationDispatcher {
    repository: NotificationRepository,
    factory: Arc<ChannelFactory>,
    policy: ChannelPolicy,
    channel_configs: HashMap<ChannelKind, JsonValue>,
    max_retries: u32,
}

impl NotificationDispatcher {
    /// Events this dispatcher turns into notifications
    pub const HANDLED_EVENTS: [&'static str; 3] = [
        DomainEvent::FAVORITE_ADDED,
        DomainEvent::PRODUCT_PRICE_CHANGED,
        DomainEvent::PRODUCT_BACK_IN_STOCK,
    ];

    pub fn new(
        repository: NotificationRepository,
        factory: Arc<ChannelFactory>,
        policy: ChannelPolicy,
        max_retries: u32,
    ) -> Self {
        Self {
            repository,
            factory,
            policy,
            channel_configs: HashMap::new(),
            max_retries,
        }
    }

    /// Sets the configuration passed to the factory for `kind`.
    pub fn with_channel_config(mut self, kind: ChannelKind, config: JsonValue) -> Self {
        self.channel_configs.insert(kind, config);
        self
    }

    /// Subscribes this dispatcher to every event it handles.
    pub fn subscribe_to(self: &Arc<Self>, bus: &EventBus) {
        for event in Self::HANDLED_EVENTS {
            bus.subscribe(event, self);
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn factory(&self) -> &Arc<ChannelFactory> {
        &self.factory
    }

    pub fn policy(&self) -> &ChannelPolicy {
        &self.policy
    }

    /// Resolves the strategy for a channel with its configured settings.
    pub fn resolve(&self, kind: &ChannelKind) -> AppResult<Arc<dyn ChannelStrategy>> {
        let config = self.channel_configs.get(kind).unwrap_or(&JsonValue::Null);
        self.factory.create(kind, config)
    }

    /// Handles one domain event: one record per configured channel, each
    /// dispatched in turn.
    ///
    /// Every channel is processed even when an earlier one fails to store or
    /// record its attempt.
    ///
    /// # Returns
    /// The records created, with their state after the first attempt
    ///
    /// # Errors
    /// The first error met, after all channels were processed
    pub async fn handle_event(&self, event: &DomainEvent) -> AppResult<Vec<Notification>> {
        let Some((user_id, title, message)) = compose(event) else {
            tracing::debug!(event = event.name(), "Event ignored by dispatcher");
            return Ok(Vec::new());
        };

        let channels = self.policy.channels_for(event.name(), user_id).to_vec();
        tracing::info!(
            event = event.name(),
            user_id,
            channels = channels.len(),
            "Dispatching notifications for event"
        );

        let mut records = Vec::with_capacity(channels.len());
        let mut first_error = None;
        for channel in channels {
            let new_notification =
                NewNotification::new(user_id, channel.clone(), title.clone(), message.clone());
            let result = match self.repository.add(new_notification).await {
                Ok(record) => self.dispatch(&record).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!(
                        event = event.name(),
                        user_id,
                        channel = %channel,
                        error = %e,
                        "Failed to dispatch notification for event"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(records),
        }
    }

    /// Performs one delivery attempt for a stored notification.
    ///
    /// The single attempt path for first sends and retries. Strategy errors,
    /// panics, and unresolvable channels are recorded as a failed attempt and
    /// never propagated.
    ///
    /// # Errors
    /// * `NotFound` when the record does not exist
    /// * `Conflict` when the record is `SENT`, in flight, or at the ceiling
    pub async fn dispatch(&self, notification: &Notification) -> AppResult<Notification> {
        self.attempt(notification.id, self.max_retries).await
    }

    /// Opens an attempt, then sends and records it on a separate task so the
    /// attempt is always closed, even if the caller stops waiting.
    async fn attempt(&self, id: i64, max_retries: u32) -> AppResult<Notification> {
        let record = self.repository.begin_attempt(id, max_retries).await?;
        let strategy = self.resolve(&record.channel);
        let repository = self.repository.clone();

        let handle = tokio::spawn(async move {
            let outcome = deliver(strategy, &record).await;
            let stored = repository.record_outcome(id, &outcome).await?;
            log_outcome(&stored, &outcome, max_retries);
            Ok::<_, AppError>(stored)
        });
        handle.await.map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("delivery task for notification {} failed: {}", id, e),
        })?
    }

    /// Re-attempts every PENDING or FAILED record below `max_retries`.
    ///
    /// Each eligible record gets exactly one new attempt per call; records
    /// sent by one call are not selected by the next.
    pub async fn retry_failed(&self, max_retries: u32) -> AppResult<RetryReport> {
        let candidates = self.repository.find_retryable(max_retries).await?;
        let mut report = RetryReport {
            selected: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            match self.attempt(candidate.id, max_retries).await {
                Ok(record) if record.is_sent() => report.sent += 1,
                Ok(_) => report.failed += 1,
                Err(AppError::Conflict { message }) => {
                    tracing::debug!(notification_id = candidate.id, %message, "Retry skipped");
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            selected = report.selected,
            sent = report.sent,
            failed = report.failed,
            skipped = report.skipped,
            "Retry sweep finished"
        );
        Ok(report)
    }

    /// Stores and dispatches a notification requested directly.
    ///
    /// # Errors
    /// * `Validation` for empty title or message
    /// * `UnknownChannelKind` when nothing is registered for the channel;
    ///   nothing is stored in either case
    pub async fn notify(&self, new_notification: NewNotification) -> AppResult<Notification> {
        new_notification.validate()?;
        if !self.factory.is_registered(&new_notification.channel) {
            tracing::warn!(channel = %new_notification.channel, "Rejected notification for unknown channel");
            return Err(AppError::UnknownChannelKind {
                kind: new_notification.channel.to_string(),
            });
        }

        let record = self.repository.add(new_notification).await?;
        self.dispatch(&record).await
    }

    /// Sends several notifications, one after another.
    pub async fn notify_bulk(&self, requests: Vec<NewNotification>) -> AppResult<BulkReport> {
        let mut report = BulkReport {
            total: requests.len(),
            ..Default::default()
        };

        for (index, request) in requests.into_iter().enumerate() {
            match self.notify(request).await {
                Ok(record) if record.is_sent() => report.sent += 1,
                Ok(_) => report.failed += 1,
                Err(
                    e @ (AppError::Validation { .. } | AppError::UnknownChannelKind { .. }),
                ) => report.rejected.push(format!("#{}: {}", index, e)),
                Err(e) => return Err(e),
            }
        }
        Ok(report)
    }

    /// Notifications of a user, optionally narrowed to one status
    pub async fn user_notifications(
        &self,
        user_id: i64,
        status: Option<NotificationStatus>,
    ) -> AppResult<Vec<Notification>> {
        match status {
            Some(status) => {
                self.repository
                    .find_by_user_and_status(user_id, status)
                    .await
            }
            None => self.repository.find_by_user(user_id).await,
        }
    }

    pub async fn pending_notifications(&self) -> AppResult<Vec<Notification>> {
        self.repository.find_by_status(NotificationStatus::Pending).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Notification> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("notification", "id", id))
    }
}

#[async_trait]
impl EventObserver for NotificationDispatcher {
    fn name(&self) -> &str {
        "notification-dispatcher"
    }

    async fn on_event(&self, event: &DomainEvent) -> AppResult<()> {
        self.handle_event(event).await.map(|_| ())
    }
}

/// Runs one send, turning errors, panics and unresolved channels into a
/// failed outcome.
async fn deliver(
    strategy: AppResult<Arc<dyn ChannelStrategy>>,
    record: &Notification,
) -> DeliveryOutcome {
    let strategy = match strategy {
        Ok(strategy) => strategy,
        Err(e) => return DeliveryOutcome::Failed(e.to_string()),
    };

    match AssertUnwindSafe(strategy.send(record)).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => DeliveryOutcome::Failed(e.to_string()),
        Err(_) => DeliveryOutcome::Failed(format!("{} strategy panicked", strategy.name())),
    }
}

fn log_outcome(stored: &Notification, outcome: &DeliveryOutcome, max_retries: u32) {
    match outcome {
        DeliveryOutcome::Delivered => tracing::info!(
            notification_id = stored.id,
            channel = %stored.channel,
            attempt = stored.attempts,
            "Notification sent"
        ),
        DeliveryOutcome::Failed(reason) if stored.attempts >= max_retries => tracing::error!(
            notification_id = stored.id,
            channel = %stored.channel,
            attempt = stored.attempts,
            error = %reason,
            "Notification failed permanently, retry ceiling reached"
        ),
        DeliveryOutcome::Failed(reason) => tracing::warn!(
            notification_id = stored.id,
            channel = %stored.channel,
            attempt = stored.attempts,
            error = %reason,
            "Notification delivery failed"
        ),
    }
}

/// Recipient, title and message for events the dispatcher understands.
fn compose(event: &DomainEvent) -> Option<(i64, String, String)> {
    match event {
        DomainEvent::FavoriteAdded(e) => Some((
            e.user_id,
            "Added to favorites".to_string(),
            format!(
                "You added '{}' to your favorites.",
                product_label(e.product_name.as_deref(), e.product_id)
            ),
        )),
        DomainEvent::ProductPriceChanged(e) => Some((
            e.user_id,
            "Price changed".to_string(),
            format!(
                "The price of '{}' changed from {:.2} to {:.2}.",
                product_label(e.product_name.as_deref(), e.product_id),
                e.old_price,
                e.new_price
            ),
        )),
        DomainEvent::ProductBackInStock(e) => Some((
            e.user_id,
            "Back in stock".to_string(),
            format!(
                "'{}' is available again.",
                product_label(e.product_name.as_deref(), e.product_id)
            ),
        )),
        DomainEvent::Unrecognized { .. } => None,
    }
}

fn product_label(name: Option<&str>, product_id: i64) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => format!("product #{}", product_id),
    }
}
