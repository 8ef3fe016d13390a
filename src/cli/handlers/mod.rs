//! Command handlers.

mod migrate;
mod serve;

pub use migrate::MigrateCommandHandler;
pub use serve::ServeCommandHandler;
