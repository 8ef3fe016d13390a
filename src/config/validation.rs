//! Configuration validation.
//!
//! Each section validates itself; [`Settings::validate`] reports the first
//! failing field.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, LoggerSettings, PaginationConfig, ServerConfig, Settings,
};
use crate::repositories::query::MAX_PAGE_SIZE;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const VALID_DATABASE_SCHEMES: &[&str] = &["postgres://", "postgresql://"];

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::validation("server.host", "Host must not be empty."));
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535.",
            ));
        }

        if let Some(origin) = self
            .cors_allowed_origins
            .iter()
            .find(|origin| !origin.starts_with("http://") && !origin.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError {
                field: "server.cors_allowed_origins".to_string(),
                message: format!("Origin '{}' must start with http:// or https://", origin),
            });
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// # Validation Rules
    /// - URL is a `postgres://` or `postgresql://` URL
    /// - 1 <= min_connections <= max_connections
    /// - Both timeouts are greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Set database.url or EMPORIUM_DATABASE__URL.",
            ));
        }

        if !VALID_DATABASE_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL. Expected postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        if self.query_timeout == 0 {
            return Err(ConfigError::validation(
                "database.query_timeout",
                "Query timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.max_page_size) {
            return Err(ConfigError::ValidationError {
                field: "pagination.max_page_size".to_string(),
                message: format!("Max page size must be between 1 and {}.", MAX_PAGE_SIZE),
            });
        }

        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            return Err(ConfigError::ValidationError {
                field: "pagination.default_page_size".to_string(),
                message: format!(
                    "Default page size must be between 1 and max_page_size ({}).",
                    self.max_page_size
                ),
            });
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one of logger.console and logger.file must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.pagination.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_field(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/emporium".to_string();
        settings
    }

    #[test]
    fn test_valid_settings() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_server_port_zero() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert_eq!(failing_field(settings.validate()), "server.port");
    }

    #[test]
    fn test_server_cors_origin_needs_scheme() {
        let mut config = ServerConfig::default();
        config.cors_allowed_origins = vec!["https://shop.example".to_string()];
        assert!(config.validate().is_ok());

        config.cors_allowed_origins.push("shop.example".to_string());
        assert_eq!(failing_field(config.validate()), "server.cors_allowed_origins");
    }

    #[test]
    fn test_database_url_required_and_postgres() {
        assert_eq!(failing_field(Settings::default().validate()), "database.url");

        for url in ["mysql://localhost/db", "sqlite://db.sqlite", "localhost"] {
            let config = DatabaseConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert_eq!(failing_field(config.validate()), "database.url", "{}", url);
        }

        let config = DatabaseConfig {
            url: "postgresql://user:secret@db:5432/emporium".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_connection_bounds() {
        let base = valid_settings().database;

        let config = DatabaseConfig {
            max_connections: 0,
            ..base.clone()
        };
        assert_eq!(failing_field(config.validate()), "database.max_connections");

        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..base.clone()
        };
        assert_eq!(failing_field(config.validate()), "database.min_connections");

        let config = DatabaseConfig {
            query_timeout: 0,
            ..base
        };
        assert_eq!(failing_field(config.validate()), "database.query_timeout");
    }

    #[test]
    fn test_pagination_bounds() {
        let config = PaginationConfig {
            default_page_size: 20,
            max_page_size: 5000,
        };
        assert_eq!(failing_field(config.validate()), "pagination.max_page_size");

        let config = PaginationConfig {
            default_page_size: 200,
            max_page_size: 100,
        };
        assert_eq!(failing_field(config.validate()), "pagination.default_page_size");

        let config = PaginationConfig {
            default_page_size: 0,
            max_page_size: 100,
        };
        assert_eq!(failing_field(config.validate()), "pagination.default_page_size");

        assert!(PaginationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_logger_levels_and_formats() {
        for level in ["trace", "INFO", "Warn"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "{}", level);
        }

        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(failing_field(settings.validate()), "logger.level");

        let settings = LoggerSettings {
            file: FileSettings {
                format: "xml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(failing_field(settings.validate()), "logger.file.format");
    }

    #[test]
    fn test_logger_needs_an_output() {
        let mut settings = LoggerSettings::default();
        settings.console.enabled = false;
        assert_eq!(failing_field(settings.validate()), "logger");

        settings.file.enabled = true;
        assert!(settings.validate().is_ok());

        settings.file.path = " ".to_string();
        assert_eq!(failing_field(settings.validate()), "logger.file.path");
    }
}
