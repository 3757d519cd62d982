//! Notification repository.
//!
//! Every read-modify-write runs under the store mutex, so two writers never
//! observe the same intermediate record.

use jiff::Timestamp;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{
    DeliveryOutcome, NewNotification, Notification, NotificationStatus, NotificationUpdate,
};

/// Notification repository
#[derive(Clone)]
pub struct NotificationRepository {
    store: Store,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository over the given store handle.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Persists a new notification
    ///
    /// # Returns
    /// The stored record with its id, timestamps, `PENDING` status and zero attempts
    pub async fn add(&self, new_notification: NewNotification) -> AppResult<Notification> {
        let mut state = self.store.lock().await;
        let now = Timestamp::now();
        let record = Notification {
            id: state.allocate_id(),
            user_id: new_notification.user_id,
            channel: new_notification.channel,
            title: new_notification.title,
            message: new_notification.message,
            status: NotificationStatus::Pending,
            attempts: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
            sent_at: None,
        };
        self.store.commit(&mut state, record.clone()).await?;

        tracing::debug!(
            notification_id = record.id,
            user_id = record.user_id,
            channel = %record.channel,
            "Notification stored"
        );
        Ok(record)
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Notification>> {
        Ok(self.store.lock().await.get(id).cloned())
    }

    /// All notifications for a user, ordered by id
    pub async fn find_by_user(&self, user_id: i64) -> AppResult<Vec<Notification>> {
        Ok(self.store.lock().await.by_user(user_id))
    }

    /// All notifications in a status, ordered by id
    pub async fn find_by_status(&self, status: NotificationStatus) -> AppResult<Vec<Notification>> {
        Ok(self.store.lock().await.by_status(status))
    }

    pub async fn find_by_user_and_status(
        &self,
        user_id: i64,
        status: NotificationStatus,
    ) -> AppResult<Vec<Notification>> {
        let mut records = self.store.lock().await.by_user(user_id);
        records.retain(|n| n.status == status);
        Ok(records)
    }

    pub async fn count(&self) -> AppResult<usize> {
        Ok(self.store.lock().await.len())
    }

    /// Applies a partial update
    ///
    /// # Errors
    /// * `NotFound` when no record has this id
    /// * `Conflict` when the record is already `SENT`
    /// * `Validation` when the update would lower the attempt count
    pub async fn update(&self, id: i64, update: NotificationUpdate) -> AppResult<Notification> {
        let mut state = self.store.lock().await;
        let mut record = state
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("notification", "id", id))?;

        if record.is_sent() {
            return Err(sent_conflict(id));
        }
        if update.is_empty() {
            return Ok(record);
        }

        if let Some(attempts) = update.attempts {
            if attempts < record.attempts {
                return Err(AppError::validation(
                    "attempts",
                    format!(
                        "attempts cannot decrease from {} to {}",
                        record.attempts, attempts
                    ),
                ));
            }
            record.attempts = attempts;
        }
        if let Some(last_error) = update.last_error {
            record.last_error = last_error;
        }

        let now = Timestamp::now();
        if let Some(status) = update.status {
            if status == NotificationStatus::Sent {
                record.sent_at = Some(now);
            }
            record.status = status;
        }
        record.updated_at = now;

        self.store.commit(&mut state, record.clone()).await?;
        Ok(record)
    }

    /// PENDING or FAILED records below the retry ceiling, ordered by id.
    ///
    /// Records with an attempt already in flight are skipped.
    pub async fn find_retryable(&self, max_retries: u32) -> AppResult<Vec<Notification>> {
        let state = self.store.lock().await;
        Ok(state
            .all()
            .filter(|n| n.is_retryable(max_retries) && !state.is_in_flight(n.id))
            .cloned()
            .collect())
    }

    /// Opens a delivery attempt
    ///
    /// Checks eligibility, increments `attempts`, sets `PENDING` and marks the
    /// record in flight, all in one critical section. The record is marked
    /// only once the incremented count is stored.
    ///
    /// # Errors
    /// * `NotFound` when no record has this id
    /// * `Conflict` when the record is `SENT`, already in flight, or has
    ///   reached `max_retries`
    pub async fn begin_attempt(&self, id: i64, max_retries: u32) -> AppResult<Notification> {
        let mut state = self.store.lock().await;
        let mut record = state
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("notification", "id", id))?;

        if record.is_sent() {
            return Err(sent_conflict(id));
        }
        if state.is_in_flight(id) {
            return Err(AppError::Conflict {
                message: format!("notification {} already has an attempt in flight", id),
            });
        }
        if record.attempts >= max_retries {
            return Err(AppError::Conflict {
                message: format!(
                    "notification {} reached the retry ceiling ({} attempts)",
                    id, record.attempts
                ),
            });
        }

        record.attempts += 1;
        record.status = NotificationStatus::Pending;
        record.updated_at = Timestamp::now();
        self.store.commit(&mut state, record.clone()).await?;
        state.mark_in_flight(id);
        Ok(record)
    }

    /// Closes the attempt opened by `begin_attempt` and records its result.
    ///
    /// The in-flight mark is released even when storing the result fails; the
    /// record then stays `PENDING` and is picked up by the next retry.
    pub async fn record_outcome(
        &self,
        id: i64,
        outcome: &DeliveryOutcome,
    ) -> AppResult<Notification> {
        let mut state = self.store.lock().await;
        state.clear_in_flight(id);

        let mut record = state
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("notification", "id", id))?;
        if record.is_sent() {
            return Err(sent_conflict(id));
        }

        let now = Timestamp::now();
        match outcome {
            DeliveryOutcome::Delivered => {
                record.status = NotificationStatus::Sent;
                record.last_error = None;
                record.sent_at = Some(now);
            }
            DeliveryOutcome::Failed(reason) => {
                record.status = NotificationStatus::Failed;
                record.last_error = Some(reason.clone());
            }
        }
        record.updated_at = now;

        self.store.commit(&mut state, record.clone()).await?;
        Ok(record)
    }
}

fn sent_conflict(id: i64) -> AppError {
    AppError::Conflict {
        message: format!("notification {} was already sent", id),
    }
}
