//! Notification request and response DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppResult;
use crate::models::{NewNotification, Notification, NotificationStatus};
use crate::services::{BulkReport, RetryReport};

/// Body of `POST /api/notifications`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "user_id": 1,
    "type": "email",
    "title": "Price drop",
    "message": "Widget is now 19.99"
}))]
pub struct CreateNotificationRequest {
    #[validate(range(min = 1, message = "User id must be positive"))]
    pub user_id: i64,

    /// Channel kind, e.g. `email`, `sms`, `push`
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Channel type is required"))]
    pub kind: String,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

impl CreateNotificationRequest {
    /// Fails with `Validation` when `type` is not a well-formed channel kind.
    pub fn into_new_notification(self) -> AppResult<NewNotification> {
        Ok(NewNotification::new(
            self.user_id,
            self.kind.parse()?,
            self.title,
            self.message,
        ))
    }
}

/// Body of `POST /api/notifications/bulk`
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkNotificationRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 notifications per request"))]
    pub notifications: Vec<CreateNotificationRequest>,
}

/// Query of `GET /api/notifications`
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Owner of the notifications
    #[validate(range(min = 1, message = "User id must be positive"))]
    #[param(minimum = 1, example = 1)]
    pub user_id: i64,

    /// Optional status filter: pending, sent or failed
    #[param(example = "failed")]
    pub status: Option<String>,
}

impl NotificationQuery {
    pub fn status(&self) -> AppResult<Option<NotificationStatus>> {
        self.status.as_deref().map(str::parse).transpose()
    }
}

/// A notification as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    #[schema(example = "email")]
    pub channel: String,
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub sent_at: Option<String>,
}

impl From<Notification> for NotificationResponse {
    fn from(record: Notification) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            channel: record.channel.to_string(),
            title: record.title,
            message: record.message,
            status: record.status,
            attempts: record.attempts,
            last_error: record.last_error,
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
            sent_at: record.sent_at.map(|t| t.to_string()),
        }
    }
}

/// List wrapper with the number of records
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub count: usize,
    pub notifications: Vec<NotificationResponse>,
}

impl From<Vec<Notification>> for NotificationListResponse {
    fn from(records: Vec<Notification>) -> Self {
        let notifications: Vec<NotificationResponse> =
            records.into_iter().map(NotificationResponse::from).collect();
        Self {
            count: notifications.len(),
            notifications,
        }
    }
}

/// Result of `POST /api/notifications/retry`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryResponse {
    /// Records picked up by the sweep
    pub retried: usize,
    pub sent: usize,
    pub failed: usize,
    /// Records already being delivered by someone else
    pub skipped: usize,
}

impl From<RetryReport> for RetryResponse {
    fn from(report: RetryReport) -> Self {
        Self {
            retried: report.selected,
            sent: report.sent,
            failed: report.failed,
            skipped: report.skipped,
        }
    }
}

/// Result of `POST /api/notifications/bulk`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkResponse {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub rejected: Vec<String>,
}

impl From<BulkReport> for BulkResponse {
    fn from(report: BulkReport) -> Self {
        Self {
            total: report.total,
            sent: report.sent,
            failed: report.failed,
            rejected: report.rejected,
        }
    }
}
