//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `notification` - notification CRUD, retry and bulk DTOs
//! - `event` - domain event publication
//! - `channel` - channel listing
//! - `health` - health check
//! - `error` - common error response

mod channel;
mod error;
mod event;
mod health;
mod notification;

pub use channel::ChannelListResponse;
pub use error::ErrorResponse;
pub use event::{ObserverFailureResponse, PublishEventRequest, PublishEventResponse};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use notification::{
    BulkNotificationRequest, BulkResponse, CreateNotificationRequest, NotificationListResponse,
    NotificationQuery, NotificationResponse, RetryResponse,
};
