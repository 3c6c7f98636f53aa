//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub permissions: PermissionsConfig,
}

/// REST API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Client-side ceiling on outgoing requests, unlimited when absent
    pub max_requests_per_second: Option<u32>,
}

/// Where the authenticated session is persisted
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum SessionConfig {
    Memory,
    File { path: String },
    Redis { url: String, prefix: String },
}

/// Query cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub max_capacity: u64,
    /// Seconds a read stays fresh, 0 keeps it until invalidated
    pub stale_seconds: u64,
    pub query_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<String>,
    pub file_name: String,
}

/// Role to permission table source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PermissionsConfig {
    /// TOML file replacing the built-in role table
    pub table_path: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    ///
    /// Environment variables use the `BULLETIN` prefix and `__` as the
    /// section separator, e.g. `BULLETIN_API__BASE_URL`.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a named configuration file (extension optional)
    pub fn from_file(name: &str) -> Result<Self, config::ConfigError> {
        let defaults = config::Config::try_from(&Settings::default())?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("BULLETIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ConsoleError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_seconds: 30,
                user_agent: format!("bulletin-console/{}", env!("CARGO_PKG_VERSION")),
                max_requests_per_second: None,
            },
            session: SessionConfig::File {
                path: ".bulletin-session.json".to_string(),
            },
            cache: CacheConfig {
                max_capacity: 1_000,
                stale_seconds: 30,
                query_retries: 3,
                retry_base_delay_ms: 1_000,
                retry_max_delay_ms: 30_000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: None,
                file_name: "bulletin-console.log".to_string(),
            },
            permissions: PermissionsConfig::default(),
        }
    }
}
