//! Shared state handed to every request handler.

use std::time::Duration;

use crate::config::PaginationConfig;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Cloning is cheap: the services and the pool share one `Arc`'d pool.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Used directly by the health check
    pub db_pool: AsyncDbPool,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// Builds the repositories and services on top of `pool`.
    ///
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(pool, settings.database.query_timeout(), settings.pagination);
    /// ```
    pub fn new(pool: AsyncDbPool, query_timeout: Duration, pagination: PaginationConfig) -> Self {
        let repos = Repositories::new(pool.clone(), query_timeout);
        Self {
            services: Services::new(repos),
            db_pool: pool,
            pagination,
        }
    }
}
