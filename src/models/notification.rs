//! Notification records and the delivery state machine vocabulary.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ChannelKind;
use crate::error::AppError;

// ============================================================================
// Enums
// ============================================================================

/// Delivery status of a notification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(NotificationStatus::Pending),
            "sent" => Ok(NotificationStatus::Sent),
            "failed" => Ok(NotificationStatus::Failed),
            _ => Err(AppError::validation(
                "status",
                format!(
                    "Invalid status '{}'. Valid values are: pending, sent, failed",
                    s
                ),
            )),
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

// ============================================================================
// Notification Models
// ============================================================================

/// A persisted notification and its delivery bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub channel: ChannelKind,
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
    pub attempts: u32,
    #[serde(default)]
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub sent_at: Option<Timestamp>,
}

impl Notification {
    /// SENT never changes again.
    pub fn is_sent(&self) -> bool {
        self.status == NotificationStatus::Sent
    }

    /// Whether another attempt is allowed under the given retry ceiling.
    pub fn is_retryable(&self, max_retries: u32) -> bool {
        matches!(
            self.status,
            NotificationStatus::Pending | NotificationStatus::Failed
        ) && self.attempts < max_retries
    }

    /// FAILED with the ceiling reached: nothing will pick this record up again.
    pub fn is_exhausted(&self, max_retries: u32) -> bool {
        self.status == NotificationStatus::Failed && self.attempts >= max_retries
    }
}

/// Insert model for a notification that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: i64,
    pub channel: ChannelKind,
    pub title: String,
    pub message: String,
}

impl NewNotification {
    pub fn new(
        user_id: i64,
        channel: ChannelKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            channel,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Title and message must carry content.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title", "Title is required"));
        }
        if self.message.trim().is_empty() {
            return Err(AppError::validation("message", "Message is required"));
        }
        Ok(())
    }
}

/// Partial update applied by the repository under its lock.
///
/// `last_error` is doubly optional: `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationUpdate {
    pub status: Option<NotificationStatus>,
    pub attempts: Option<u32>,
    pub last_error: Option<Option<String>>,
}

impl NotificationUpdate {
    pub fn status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn last_error(mut self, error: Option<String>) -> Self {
        self.last_error = Some(error);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.attempts.is_none() && self.last_error.is_none()
    }
}
