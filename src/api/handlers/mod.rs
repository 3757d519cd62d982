//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod channels;
pub mod events;
pub mod health;
pub mod notifications;
