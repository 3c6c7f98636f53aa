//! Error handling for the bulletin console
//!
//! This module defines the error type shared by the HTTP client, the
//! resource services, the query layer and the client-side state machines.

use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Main error type for the bulletin console
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(FieldErrors),

    #[error("Row must not be empty")]
    EmptyRow,

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Shared(Arc<ConsoleError>),
}

/// Field name to validation message
pub type FieldErrors = BTreeMap<String, String>;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConsoleError {
    /// Recover an owned error from one shared between coalesced callers
    ///
    /// Variants that carry only data are rebuilt, so callers can match on
    /// them directly. Errors wrapping a foreign source (`Http`, `Io`,
    /// `Redis`, ...) stay behind [`ConsoleError::Shared`]; use
    /// [`ConsoleError::root`] to classify those.
    pub fn from_shared(error: Arc<ConsoleError>) -> Self {
        match Arc::try_unwrap(error) {
            Ok(inner) => inner,
            Err(shared) => shared.detached().unwrap_or(ConsoleError::Shared(shared)),
        }
    }

    fn detached(&self) -> Option<ConsoleError> {
        Some(match self.root() {
            ConsoleError::Api { status, message } => ConsoleError::Api { status: *status, message: message.clone() },
            ConsoleError::Unauthorized => ConsoleError::Unauthorized,
            ConsoleError::Forbidden(message) => ConsoleError::Forbidden(message.clone()),
            ConsoleError::NotFound(message) => ConsoleError::NotFound(message.clone()),
            ConsoleError::Validation(errors) => ConsoleError::Validation(errors.clone()),
            ConsoleError::EmptyRow => ConsoleError::EmptyRow,
            ConsoleError::InvalidStateTransition { from, to } => ConsoleError::InvalidStateTransition {
                from: from.clone(),
                to: to.clone(),
            },
            ConsoleError::PermissionDenied(message) => ConsoleError::PermissionDenied(message.clone()),
            ConsoleError::Authentication(message) => ConsoleError::Authentication(message.clone()),
            ConsoleError::Config(message) => ConsoleError::Config(message.clone()),
            _ => return None,
        })
    }

    /// The innermost error, looking through shared wrappers
    pub fn root(&self) -> &ConsoleError {
        match self {
            ConsoleError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// Check if the error is an authentication or authorization failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self.root(),
            ConsoleError::Unauthorized | ConsoleError::Forbidden(_) | ConsoleError::Authentication(_)
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            ConsoleError::Api { status, .. } => Some(*status),
            ConsoleError::Unauthorized => Some(401),
            ConsoleError::Forbidden(_) => Some(403),
            ConsoleError::NotFound(_) => Some(404),
            ConsoleError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if the error is recoverable (worth retrying an idempotent read)
    pub fn is_recoverable(&self) -> bool {
        match self.root() {
            ConsoleError::Http(_) => true,
            ConsoleError::Api { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            ConsoleError::Unauthorized => false,
            ConsoleError::Forbidden(_) => false,
            ConsoleError::NotFound(_) => false,
            ConsoleError::Validation(_) => false,
            ConsoleError::EmptyRow => false,
            ConsoleError::InvalidStateTransition { .. } => false,
            ConsoleError::PermissionDenied(_) => false,
            ConsoleError::Authentication(_) => false,
            ConsoleError::Config(_) => false,
            ConsoleError::Serialization(_) => false,
            ConsoleError::Io(_) => true,
            ConsoleError::UrlParse(_) => false,
            ConsoleError::Redis(_) => true,
            ConsoleError::Shared(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self.root() {
            ConsoleError::Config(_) => ErrorSeverity::Critical,
            ConsoleError::Unauthorized => ErrorSeverity::Warning,
            ConsoleError::Forbidden(_) => ErrorSeverity::Warning,
            ConsoleError::PermissionDenied(_) => ErrorSeverity::Warning,
            ConsoleError::Authentication(_) => ErrorSeverity::Warning,
            ConsoleError::Validation(_) => ErrorSeverity::Info,
            ConsoleError::EmptyRow => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Message suitable for a user-facing notification
    pub fn user_message(&self) -> String {
        match self.root() {
            ConsoleError::Api { message, .. } => message.clone(),
            ConsoleError::Validation(errors) => format_field_errors(errors),
            other => other.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_error_unwraps_when_unique() {
        let shared = Arc::new(ConsoleError::Unauthorized);
        let error = ConsoleError::from_shared(shared);
        assert!(matches!(error, ConsoleError::Unauthorized));
    }

    #[test]
    fn test_shared_data_error_is_rebuilt() {
        let shared = Arc::new(ConsoleError::Forbidden("nope".to_string()));
        let _other = shared.clone();
        let error = ConsoleError::from_shared(shared);

        assert!(matches!(error, ConsoleError::Forbidden(ref message) if message == "nope"));
        assert!(error.is_auth_error());
        assert_eq!(error.status(), Some(403));
    }

    #[test]
    fn test_shared_source_error_keeps_classification() {
        let shared = Arc::new(ConsoleError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")));
        let _other = shared.clone();
        let error = ConsoleError::from_shared(shared);

        assert!(matches!(error, ConsoleError::Shared(_)));
        assert!(matches!(error.root(), ConsoleError::Io(_)));
        assert!(error.is_recoverable());
        assert!(!error.is_auth_error());
    }

    #[test]
    fn test_server_errors_are_recoverable() {
        let error = ConsoleError::Api { status: 503, message: "down".to_string() };
        assert!(error.is_recoverable());

        let error = ConsoleError::Api { status: 400, message: "bad".to_string() };
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.insert("name".to_string(), "required".to_string());
        errors.insert("organization_id".to_string(), "required".to_string());

        let error = ConsoleError::Validation(errors);
        assert_eq!(error.user_message(), "name: required; organization_id: required");
        assert_eq!(error.severity(), ErrorSeverity::Info);
    }
}
