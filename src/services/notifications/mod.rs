//! Notification delivery.
//!
//! Channel strategies share the `ChannelStrategy` contract and are resolved by
//! kind through the `ChannelFactory`. The `NotificationDispatcher` observes
//! domain events and drives every record through its delivery state machine.

mod dispatcher;
mod email;
mod factory;
mod log_channel;
mod policy;
mod push;
mod sms;
mod strategy;
mod webhook;

pub use dispatcher::{BulkReport, NotificationDispatcher, RetryReport};
pub use email::EmailStrategy;
pub use factory::{ChannelConstructor, ChannelFactory};
pub use log_channel::LogStrategy;
pub use policy::ChannelPolicy;
pub use push::PushStrategy;
pub use sms::SmsStrategy;
pub use strategy::ChannelStrategy;
pub use webhook::WebhookStrategy;
