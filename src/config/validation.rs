//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{ConsoleError, Result};
use super::{Settings, SessionConfig};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_api_config(&settings.api)?;
    validate_session_config(&settings.session)?;
    validate_cache_config(&settings.cache)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref path) = settings.permissions.table_path {
        if path.is_empty() {
            return Err(ConsoleError::Config(
                "Permission table path must not be empty".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate API configuration
fn validate_api_config(config: &super::ApiConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(ConsoleError::Config(
            "API base URL is required".to_string()
        ));
    }

    let parsed = url::Url::parse(&config.base_url)
        .map_err(|e| ConsoleError::Config(format!("Invalid API base URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConsoleError::Config(
            format!("Unsupported API URL scheme: {}", parsed.scheme())
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(ConsoleError::Config(
            "API timeout must be greater than 0".to_string()
        ));
    }

    if config.max_requests_per_second == Some(0) {
        return Err(ConsoleError::Config(
            "Request rate limit must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate session store configuration
fn validate_session_config(config: &SessionConfig) -> Result<()> {
    match config {
        SessionConfig::Memory => Ok(()),
        SessionConfig::File { path } if path.is_empty() => Err(ConsoleError::Config(
            "Session file path is required".to_string()
        )),
        SessionConfig::Redis { url, .. } if url.is_empty() => Err(ConsoleError::Config(
            "Redis URL is required".to_string()
        )),
        _ => Ok(()),
    }
}

/// Validate query cache configuration
fn validate_cache_config(config: &super::CacheConfig) -> Result<()> {
    if config.max_capacity == 0 {
        return Err(ConsoleError::Config(
            "Cache capacity must be greater than 0".to_string()
        ));
    }

    if config.retry_base_delay_ms > config.retry_max_delay_ms {
        return Err(ConsoleError::Config(
            "Retry base delay cannot be greater than retry max delay".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ConsoleError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ConsoleError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.directory.is_some() && config.file_name.is_empty() {
        return Err(ConsoleError::Config(
            "Log file name is required when a log directory is set".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_base_url() {
        let mut settings = Settings::default();
        settings.api.base_url = "ftp://example.com".to_string();
        assert!(validate_settings(&settings).is_err());

        settings.api.base_url = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_zero_rate_limit() {
        let mut settings = Settings::default();
        settings.api.max_requests_per_second = Some(0);
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_inverted_retry_delays() {
        let mut settings = Settings::default();
        settings.cache.retry_base_delay_ms = 5_000;
        settings.cache.retry_max_delay_ms = 1_000;
        assert!(validate_settings(&settings).is_err());
    }
}
