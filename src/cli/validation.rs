//! Value parsers for CLI arguments.

use std::net::IpAddr;
use std::path::PathBuf;

const MAX_ROLLBACK_STEPS: u32 = 100;

const MAX_HOST_LENGTH: usize = 253;

pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(format!(
            "Port must be a number between 1 and 65535, got '{}'",
            value
        )),
    }
}

/// Accepts an existing, readable regular file.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", value));
    }
    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", value));
    }
    std::fs::File::open(&path)
        .map_err(|e| format!("Cannot read configuration file '{}': {}", value, e))?;

    Ok(path)
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("Rollback steps must be a positive number, got '{}'", value))?;

    if !(1..=MAX_ROLLBACK_STEPS).contains(&steps) {
        return Err(format!(
            "Rollback steps must be between 1 and {}, got {}",
            MAX_ROLLBACK_STEPS, steps
        ));
    }
    Ok(steps)
}

/// Accepts an IP address or a DNS host name.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address: '{}'", value));
    }
    if host.len() > MAX_HOST_LENGTH {
        return Err(format!(
            "Host name is too long (maximum {} characters)",
            MAX_HOST_LENGTH
        ));
    }

    let valid_label = |label: &str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !host.split('.').all(valid_label) {
        return Err(format!("Invalid host name: '{}'", value));
    }

    Ok(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_port() {
        for port in ["1", "3000", "65535"] {
            assert!(validate_port(port).is_ok(), "{}", port);
        }
        for port in ["0", "65536", "-1", "http", ""] {
            assert!(validate_port(port).is_err(), "{}", port);
        }
    }

    #[test]
    fn test_host() {
        for host in ["localhost", "127.0.0.1", "0.0.0.0", "::1", "api.shop-1.example"] {
            assert_eq!(validate_host_address(host).unwrap(), host);
        }
        assert_eq!(validate_host_address("  localhost ").unwrap(), "localhost");

        let long = "x".repeat(300);
        for host in ["", "   ", "bad host", "999.1.1.1", "-edge.example", "a..b", &long] {
            assert!(validate_host_address(host).is_err(), "'{}'", host);
        }
    }

    #[test]
    fn test_rollback_steps() {
        for steps in ["1", "42", "100"] {
            assert!(validate_rollback_steps(steps).is_ok(), "{}", steps);
        }
        for steps in ["0", "101", "-1", "two", ""] {
            assert!(validate_rollback_steps(steps).is_err(), "{}", steps);
        }
    }

    #[test]
    fn test_config_file_path() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(validate_config_file_path(path).unwrap(), file.path());

        let dir = file.path().parent().unwrap().to_str().unwrap();
        assert!(validate_config_file_path(dir).unwrap_err().contains("not a file"));
        assert!(
            validate_config_file_path("/definitely/missing/emporium.toml")
                .unwrap_err()
                .contains("does not exist")
        );
    }
}
