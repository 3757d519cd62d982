//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Event-driven notification dispatch service
#[derive(Parser, Debug)]
#[command(name = "herald-rs")]
#[command(about = "Event-driven notification dispatch service")]
#[command(long_about = "
herald-rs turns domain events into user notifications and delivers them over
pluggable channels (email, sms, push, webhook, log), retrying failed
deliveries up to a configured ceiling.

EXAMPLES:
    # Start the server with default configuration
    herald-rs serve

    # Start server on custom host and port
    herald-rs serve --host 0.0.0.0 --port 8080

    # Use custom configuration file
    herald-rs --config /path/to/config.toml serve

    # Check configuration and channel setup without starting anything
    herald-rs check

    # Retry FAILED notifications once against the persisted store
    herald-rs retry --max-retries 5
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load a single TOML file instead of the layered `config/` directory.
    /// `HERALD_*` environment variables still override it.
    ///
    /// Example: --config /etc/herald/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{env}.toml` is layered over the defaults.
    ///
    /// Available values: development (dev), production (prod), test
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and the retry sweep (default)
    ///
    /// Examples:
    ///   herald-rs serve                           # Start with defaults
    ///   herald-rs serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   herald-rs serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        ///
        /// Default: 127.0.0.1
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        ///
        /// Default: 3000
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over the configuration file and --verbose/--quiet.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },

    /// Run one retry sweep over FAILED notifications and exit
    ///
    /// Opens the configured store, re-attempts every FAILED notification
    /// whose attempt count is below the ceiling, and prints the report.
    Retry {
        /// Attempt ceiling for this sweep
        ///
        /// Defaults to `notifications.max_retries`.
        #[arg(long, value_name = "N", value_parser = super::validation::validate_max_retries)]
        max_retries: Option<u32>,
    },

    /// Validate configuration and every configured channel, then exit
    Check,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}
