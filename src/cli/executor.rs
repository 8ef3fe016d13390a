//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;

/// Runs the command in `cli` with the merged `settings`. No subcommand
/// means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_serve_dry_run_does_not_start_server() {
        let cli = Cli::try_parse_from(["emporium", "serve", "--dry-run"]).unwrap();
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/emporium".to_string();

        assert!(execute_command(&cli, settings).await.is_ok());
    }

    #[tokio::test]
    async fn test_migrate_requires_database_url() {
        let cli = Cli::try_parse_from(["emporium", "migrate", "--dry-run"]).unwrap();
        let err = execute_command(&cli, Settings::default()).await.unwrap_err();
        assert!(err.to_string().contains("database.url"));
    }
}
