//! Async database connection pool and embedded migrations.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Shared async connection pool. Cloning only bumps a reference count.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type Manager = AsyncDieselConnectionManager<AsyncPgConnection>;

fn pool_builder(config: &DatabaseConfig) -> bb8::Builder<Manager> {
    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
}

/// Creates an async database connection pool and opens `min_connections`
/// connections up front.
///
/// # Errors
///
/// Returns `AppError::ConnectionPool` when the initial connections cannot be
/// established.
pub async fn establish_async_connection_pool(
    config: &DatabaseConfig,
) -> Result<AsyncDbPool, AppError> {
    let manager = Manager::new(config.url.clone());
    pool_builder(config)
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
}

/// Creates a pool without connecting. Connections are opened on first use.
pub fn lazy_connection_pool(config: &DatabaseConfig) -> AsyncDbPool {
    let manager = Manager::new(config.url.clone());
    pool_builder(config).build_unchecked(manager)
}
