//! Command handlers for CLI operations
//!
//! This module contains handlers for different CLI commands,
//! separating command execution logic from parsing and validation.

pub mod check;
pub mod retry;
pub mod serve;

pub use check::CheckCommandHandler;
pub use retry::RetryCommandHandler;
pub use serve::ServeCommandHandler;
