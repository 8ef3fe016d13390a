//! Layered configuration loading.
//!
//! Sources, lowest priority first:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml` (optional)
//! 3. `local.toml` (optional)
//! 4. `EMPORIUM_*` environment variables, `__` separating nested keys
//!
//! A single configuration file may replace the three file layers; the
//! environment variables still apply on top of it.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "EMPORIUM_CONFIG_DIR";

const CONFIG_FILE_ENV: &str = "EMPORIUM_CONFIG_FILE";

const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "EMPORIUM";

const ENV_SEPARATOR: &str = "__";

/// Keys whose environment values are comma-separated lists.
const ENV_LIST_KEYS: &[&str] = &["server.cors_allowed_origins"];

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, replaces the layered files
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>, environment: AppEnvironment) -> Self {
        Self {
            config_dir: config_dir.into(),
            config_file: None,
            environment,
        }
    }

    /// Builds a loader from `EMPORIUM_CONFIG_DIR`, `EMPORIUM_CONFIG_FILE`
    /// and `EMPORIUM_APP_ENV`.
    ///
    /// # Errors
    ///
    /// `MutualExclusivityError` when both the directory and the file
    /// variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{} and {} cannot both be set. Use {} for layered configuration \
                 or {} for a single configuration file.",
                CONFIG_DIR_ENV, CONFIG_FILE_ENV, CONFIG_DIR_ENV, CONFIG_FILE_ENV
            )));
        }

        Ok(Self {
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Loads only `path` instead of the layered files.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Loads, deserializes and validates the settings.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = match &self.config_file {
            Some(config_file) => Self::add_file_source(builder, config_file, true)?,
            None => self.add_layered_files(builder)?,
        };

        Self::add_env_source(builder).build().map_err(ConfigError::from)
    }

    fn add_layered_files(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let builder = Self::add_file_source(builder, &self.config_dir.join("default.toml"), true)?;
        let builder = Self::add_file_source(
            builder,
            &self.config_dir.join(self.environment.config_file_name()),
            false,
        )?;
        Self::add_file_source(builder, &self.config_dir.join("local.toml"), false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.is_file() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let name = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
        })?;
        Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
    }

    /// `EMPORIUM_SERVER__PORT=8080` sets `server.port`.
    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        let environment = ENV_LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true)
                .list_separator(","),
            |environment, key| environment.with_list_parse_key(key),
        );
        builder.add_source(environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // The environment source reads process-wide variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const DEFAULT_TOML: &str = r#"
[application]
name = "emporium-test"

[server]
host = "127.0.0.1"
port = 3000

[database]
url = "postgres://localhost/emporium"
max_connections = 10

[pagination]
default_page_size = 20
max_page_size = 500
"#;

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    struct EnvGuard {
        restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.restore.push((key.to_string(), std::env::var(key).ok()));
            unsafe { std::env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            self.restore.push((key.to_string(), std::env::var(key).ok()));
            unsafe { std::env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.restore.iter().rev() {
                unsafe {
                    match value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_from_env_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove(CONFIG_DIR_ENV);
        env.remove(CONFIG_FILE_ENV);
        env.remove(AppEnvironment::ENV_VAR);

        let loader = ConfigLoader::from_env().unwrap();
        assert_eq!(loader.config_dir, PathBuf::from("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_from_env_dir_and_file_are_exclusive() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/etc/emporium");
        env.set(CONFIG_FILE_ENV, "/etc/emporium/emporium.toml");

        match ConfigLoader::from_env() {
            Err(ConfigError::MutualExclusivityError(message)) => {
                assert!(message.contains(CONFIG_DIR_ENV));
                assert!(message.contains(CONFIG_FILE_ENV));
            }
            other => panic!("expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_env_reads_environment() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove(CONFIG_DIR_ENV);
        env.remove(CONFIG_FILE_ENV);
        env.set(AppEnvironment::ENV_VAR, "prod");

        let loader = ConfigLoader::from_env().unwrap();
        assert_eq!(loader.environment(), AppEnvironment::Production);
    }

    #[test]
    fn test_missing_default_toml() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[]);

        let result = ConfigLoader::new(dir.path(), AppEnvironment::Development).load();
        match result {
            Err(ConfigError::FileNotFound(message)) => assert!(message.contains("default.toml")),
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_default_toml_only() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[("default.toml", DEFAULT_TOML)]);

        let settings = ConfigLoader::new(dir.path(), AppEnvironment::Development)
            .load()
            .unwrap();
        assert_eq!(settings.application.name, "emporium-test");
        assert_eq!(settings.database.url, "postgres://localhost/emporium");
        assert_eq!(settings.pagination.max_page_size, 500);
        // Keys absent from every file keep their defaults.
        assert_eq!(settings.database.query_timeout, 30);
        assert_eq!(settings.logger.level, "info");
    }

    #[test]
    fn test_precedence_default_environment_local() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[
            ("default.toml", DEFAULT_TOML),
            (
                "production.toml",
                "[server]\nhost = \"0.0.0.0\"\nport = 8080\n\n[database]\nmax_connections = 50\n",
            ),
            ("local.toml", "[server]\nport = 9999\n"),
            ("test.toml", "[server]\nport = 1111\n"),
        ]);

        let settings = ConfigLoader::new(dir.path(), AppEnvironment::Production)
            .load()
            .unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.database.max_connections, 50);
        assert_eq!(settings.database.url, "postgres://localhost/emporium");
    }

    #[test]
    fn test_env_vars_override_files() {
        let _lock = ENV_LOCK.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set("EMPORIUM_SERVER__PORT", "7070");
        env.set("EMPORIUM_DATABASE__AUTO_MIGRATE", "true");
        env.set(
            "EMPORIUM_SERVER__CORS_ALLOWED_ORIGINS",
            "https://shop.example,https://admin.example",
        );
        let dir = config_dir(&[("default.toml", DEFAULT_TOML)]);

        let settings = ConfigLoader::new(dir.path(), AppEnvironment::Development)
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 7070);
        assert!(settings.database.auto_migrate);
        assert_eq!(
            settings.server.cors_allowed_origins,
            vec!["https://shop.example", "https://admin.example"]
        );
    }

    #[test]
    fn test_single_file_skips_layers() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("local.toml", "[server]\nport = 9999\n"),
            (
                "custom.toml",
                "[database]\nurl = \"postgres://db/custom\"\n\n[server]\nport = 4000\n",
            ),
        ]);

        let settings = ConfigLoader::new(dir.path(), AppEnvironment::Development)
            .with_config_file(dir.path().join("custom.toml"))
            .load()
            .unwrap();
        assert_eq!(settings.server.port, 4000);
        assert_eq!(settings.database.url, "postgres://db/custom");
        assert_eq!(settings.application.name, "emporium");
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let _lock = ENV_LOCK.lock().unwrap();
        let dir = config_dir(&[("default.toml", "[database]\nurl = \"mysql://localhost/db\"\n")]);

        let result = ConfigLoader::new(dir.path(), AppEnvironment::Development).load();
        assert!(matches!(
            result,
            Err(ConfigError::ValidationError { field, .. }) if field == "database.url"
        ));
    }
}
