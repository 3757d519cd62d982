//! Repository layer for data access operations.
//!
//! Repositories receive the `Store` handle at construction time and never reach
//! for global state.

mod notification_repo;

pub use notification_repo::NotificationRepository;
