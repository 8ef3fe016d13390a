//! `migrate` command.

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Lists pending migrations when `dry_run`, reverts `rollback` steps when
    /// given, and applies everything pending otherwise.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;
        let url = &self.config.database.url;

        if dry_run {
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations, database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                print_names(&pending);
                println!("\nRun without --dry-run to apply them");
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            println!("Rolling back {} migration(s)...", steps);
            let reverted = revert_migrations(url, steps).await?;
            println!("✓ Rolled back {} migration(s):", reverted.len());
            print_names(&reverted);
            return Ok(());
        }

        println!("Running database migrations...");
        let applied = run_pending_migrations(url).await?;
        if applied.is_empty() {
            println!("✓ No migrations to apply, database is up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            print_names(&applied);
        }
        Ok(())
    }
}

fn print_names(names: &[String]) {
    for name in names {
        println!("  - {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_zero_rollback_steps_fail_before_connecting() {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/emporium".to_string();

        let result = MigrateCommandHandler::new(config)
            .execute(false, Some(0))
            .await;
        match result {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "rollback_steps"),
            other => panic!("expected rollback validation error, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_missing_database_url() {
        let result = MigrateCommandHandler::new(Settings::default())
            .execute(true, None)
            .await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
