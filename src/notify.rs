//! User notifications
//!
//! Success and failure messages raised by mutations. The console shows
//! them as toasts; here they go to a [`Notifier`].

use std::fmt;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use crate::utils::errors::ConsoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Warning => write!(f, "warning"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

/// One message for the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Success, title: title.into(), message: message.into() }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Info, title: title.into(), message: message.into() }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level: NotificationLevel::Error, title: title.into(), message: message.into() }
    }

    /// Error notification carrying the user-facing text of `error`
    pub fn from_error(title: impl Into<String>, error: &ConsoleError) -> Self {
        Self::error(title, error.user_message())
    }
}

/// Sink for user notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success | NotificationLevel::Info => {
                info!(title = %notification.title, "{}", notification.message)
            }
            NotificationLevel::Warning => warn!(title = %notification.title, "{}", notification.message),
            NotificationLevel::Error => error!(title = %notification.title, "{}", notification.message),
        }
    }
}

/// Collects notifications in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().await.clone()
    }

    pub async fn last(&self) -> Option<Notification> {
        self.notifications.lock().await.last().cloned()
    }

    pub async fn clear(&self) {
        self.notifications.lock().await.clear();
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: Notification) {
        self.notifications.lock().await.push(notification);
    }
}
