//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the console client.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{ConsoleError, ErrorSeverity, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| ConsoleError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let guard = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, &config.file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .try_init()
                .map_err(|e| ConsoleError::Config(format!("Logging already initialized: {}", e)))?;
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init()
                .map_err(|e| ConsoleError::Config(format!("Logging already initialized: {}", e)))?;
            None
        }
    };

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log an outgoing API call
pub fn log_api_call(method: &str, path: &str, status: u16, duration_ms: u64) {
    debug!(
        method = method,
        path = path,
        status = status,
        duration_ms = duration_ms,
        "API call completed"
    );
}

/// Log API errors with context, at the level matching the error severity
pub fn log_api_error(operation: &str, error: &ConsoleError) {
    match error.severity() {
        ErrorSeverity::Info => info!(operation = operation, error = %error, "API operation rejected"),
        ErrorSeverity::Warning => warn!(operation = operation, error = %error, "API operation denied"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(operation = operation, error = %error, "API error occurred")
        }
    }
}

/// Log a successful mutation
pub fn log_mutation(resource: &str, action: &str, id: Option<&str>) {
    info!(
        resource = resource,
        action = action,
        id = id,
        "Mutation performed"
    );
}

/// Log user actions with structured data
pub fn log_user_action(username: &str, action: &str, details: Option<&str>) {
    info!(
        username = username,
        action = action,
        details = details,
        "User action performed"
    );
}
