//! Applies command-line overrides on top of the loaded configuration.
//!
//! Precedence, highest first: `serve` arguments, global flags, environment
//! variables, configuration files.

use super::parser::{Cli, Commands};
use crate::config::{ConfigError, ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the configuration selected by `--config` and `--env`, falling
    /// back to the `EMPORIUM_*` environment variables.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::from_env()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(environment) = cli.env {
            loader = loader.with_environment(environment);
        }

        Ok(Self::new(loader.load()?))
    }

    /// Returns the base configuration with `cli` applied, validated.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn merger() -> ConfigurationMerger {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/emporium".to_string();
        ConfigurationMerger::new(config)
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        merger().merge_cli_args(&cli)
    }

    #[test]
    fn test_no_arguments_keep_base() {
        let merged = merge(&["emporium"]).unwrap();
        assert_eq!(&merged, merger().config());
    }

    #[test]
    fn test_global_log_flags() {
        assert_eq!(merge(&["emporium", "-v"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["emporium", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let merged = merge(&[
            "emporium",
            "--verbose",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--log-level",
            "warning",
        ])
        .unwrap();

        assert_eq!(merged.server.address(), "0.0.0.0:8080");
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn test_migrate_leaves_server_untouched() {
        let merged = merge(&["emporium", "migrate", "--dry-run"]).unwrap();
        assert_eq!(merged.server, merger().config().server);
    }

    #[test]
    fn test_invalid_base_is_rejected() {
        let cli = Cli::try_parse_from(["emporium", "serve"]).unwrap();
        let err = ConfigurationMerger::new(Settings::default())
            .merge_cli_args(&cli)
            .unwrap_err();
        assert_eq!(err.key(), "database.url");
    }
}
