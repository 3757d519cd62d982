mod channel;
mod notification;

pub use channel::{ChannelKind, EmailConfig, PushConfig, SmsConfig, WebhookConfig};
pub use notification::{
    DeliveryOutcome, NewNotification, Notification, NotificationStatus, NotificationUpdate,
};
