//! Database access: async PostgreSQL pool (diesel-async over bb8) and the
//! embedded schema migrations.

mod migrations;
mod pool;

pub use migrations::{pending_migrations, revert_migrations, run_pending_migrations};
pub use pool::{AsyncDbPool, MIGRATIONS, establish_async_connection_pool, lazy_connection_pool};
