//! Service layer for business logic operations.
//!
//! Services coordinate the repositories, the channel factory and the event
//! bus; handlers and jobs only talk to this layer.

pub mod notifications;

pub use notifications::{
    BulkReport, ChannelFactory, ChannelPolicy, ChannelStrategy, NotificationDispatcher,
    RetryReport,
};
