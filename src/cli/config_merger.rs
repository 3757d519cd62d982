//! Configuration merger for CLI arguments and config files
//!
//! CLI flags override whatever the files and `HERALD_*` variables produced.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file-based configuration
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the way the CLI asked for it
    ///
    /// `--config` selects single-file mode, otherwise the layered loader is
    /// used, with `--env` replacing the detected environment.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match &cli.config {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };
        let loader = match cli.env {
            Some(env) => loader.with_environment(env.into()),
            None => loader,
        };

        tracing::debug!(environment = %loader.environment(), "Loading configuration");
        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration
    ///
    /// Command-level flags win over global ones, which win over the files.
    /// The merged result is validated again.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(ref command) = cli.command {
            Self::apply_command_overrides(&mut config, command);
        }

        config.validate()?;

        Ok(config)
    }

    fn apply_command_overrides(config: &mut Settings, command: &Commands) {
        match command {
            Commands::Serve {
                host,
                port,
                log_level,
                dry_run: _,
            } => {
                if let Some(host_addr) = host {
                    config.server.host = host_addr.clone();
                }
                if let Some(port_num) = port {
                    config.server.port = *port_num;
                }
                if let Some(level) = log_level {
                    config.logger.level = level.as_str().to_string();
                }
            }
            Commands::Retry { max_retries } => {
                if let Some(max_retries) = max_retries {
                    config.notifications.max_retries = *max_retries;
                }
            }
            Commands::Check => {}
        }
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn merged(args: &[&str]) -> Settings {
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from(args).unwrap();
        merger.merge_cli_args(&cli).unwrap()
    }

    #[test]
    fn test_configuration_merger_new() {
        let base_config = Settings::default();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_global_log_flags() {
        assert_eq!(merged(&["herald-rs", "--verbose"]).logger.level, "debug");
        assert_eq!(merged(&["herald-rs", "--quiet"]).logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merged(&["herald-rs", "serve", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_command_log_level_overrides_global() {
        let config = merged(&["herald-rs", "--verbose", "serve", "--log-level", "warn"]);
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_retry_overrides_max_retries() {
        let config = merged(&["herald-rs", "retry", "--max-retries", "9"]);
        assert_eq!(config.notifications.max_retries, 9);

        let config = merged(&["herald-rs", "retry"]);
        assert_eq!(
            config.notifications.max_retries,
            Settings::default().notifications.max_retries
        );
    }

    #[test]
    fn test_from_cli_single_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("herald.toml");
        std::fs::write(&file, "[server]\nport = 4100\n").unwrap();

        let cli = Cli::try_parse_from(["herald-rs", "--config", file.to_str().unwrap(), "check"])
            .unwrap();
        let merger = ConfigurationMerger::from_cli(&cli).unwrap();
        assert_eq!(merger.config().server.port, 4100);
    }
}
