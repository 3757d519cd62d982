//! Value parsers for CLI arguments
//!
//! clap calls these while parsing, so a bad value is reported with the
//! argument name before any configuration is loaded.

use std::net::IpAddr;
use std::path::PathBuf;

/// Same ceiling as `notifications.max_retries` in the configuration.
const MAX_RETRIES_LIMIT: u32 = 100;

/// Validate port number is within valid range (1-65535)
pub fn validate_port(port_str: &str) -> Result<u16, String> {
    let port: u16 = port_str.parse().map_err(|_| {
        format!(
            "Port must be a valid number between 1 and 65535, got: '{}'",
            port_str
        )
    })?;

    if port == 0 {
        return Err("Port must be between 1 and 65535. Port 0 is not allowed.".to_string());
    }

    Ok(port)
}

/// Validate that a configuration file exists, is a regular file and is readable
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{}': {}", path_str, e))
}

/// Accepts an IP literal, `localhost`, or a plausible DNS name
pub fn validate_host_address(host_str: &str) -> Result<String, String> {
    let host = host_str.trim();

    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }

    if host.parse::<IpAddr>().is_ok() || host == "localhost" {
        return Ok(host.to_string());
    }

    // Dotted digits that failed to parse as an IP are a typo, not a hostname.
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address format: '{}'", host_str));
    }

    if host.len() > 253 {
        return Err("Host address is too long (maximum 253 characters)".to_string());
    }

    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if !host.split('.').all(valid_label) {
        return Err(format!("Invalid host name: '{}'", host_str));
    }

    Ok(host.to_string())
}

/// Validate a `--max-retries` override
pub fn validate_max_retries(value: &str) -> Result<u32, String> {
    let max_retries: u32 = value
        .parse()
        .map_err(|_| format!("Max retries must be a positive number, got: '{}'", value))?;

    if max_retries == 0 || max_retries > MAX_RETRIES_LIMIT {
        return Err(format!(
            "Max retries must be between 1 and {}",
            MAX_RETRIES_LIMIT
        ));
    }

    Ok(max_retries)
}
