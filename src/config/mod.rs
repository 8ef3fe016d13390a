//! Configuration management.
//!
//! Settings are layered from TOML files and `EMPORIUM_*` environment
//! variables (see [`ConfigLoader`]) and validated before use. CLI flags are
//! applied on top by the `cli` module.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{DatabaseConfig, PaginationConfig, ServerConfig, Settings};
