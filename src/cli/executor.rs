//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{CheckCommandHandler, RetryCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;

/// What the caller should do once a command has been executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Start the HTTP server
    StartServer,
    /// The command ran to completion
    Done,
}

/// Execute a CLI command with the given settings
///
/// `serve` without `--dry-run` (and no subcommand at all) is not executed
/// here: the caller owns the server lifecycle.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<Outcome> {
    warn_on_privileged_bind(cli);

    match &cli.command {
        Some(Commands::Serve { dry_run: true, .. }) => {
            ServeCommandHandler::new(settings).execute(true).await?;
            Ok(Outcome::Done)
        }
        Some(Commands::Serve { .. }) | None => Ok(Outcome::StartServer),
        Some(Commands::Retry { .. }) => {
            RetryCommandHandler::new(settings).execute().await?;
            Ok(Outcome::Done)
        }
        Some(Commands::Check) => {
            CheckCommandHandler::new(settings).execute().await?;
            Ok(Outcome::Done)
        }
    }
}

fn warn_on_privileged_bind(cli: &Cli) {
    if let Some(Commands::Serve {
        port: Some(port), ..
    }) = &cli.command
        && *port < 1024
    {
        tracing::warn!(
            port = *port,
            "Binding to a port below 1024 typically requires root privileges"
        );
    }
}
