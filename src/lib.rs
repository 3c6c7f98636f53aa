//! Bulletin Console
//!
//! Client library for the statistical bulletin administration API: typed
//! resource services, a caching query layer, session persistence, role
//! based permission gating and the client-side state machines of the
//! console (editable bulletin grid, create/edit modals, resource tables).

pub mod client;
pub mod config;
pub mod forms;
pub mod grid;
pub mod models;
pub mod notify;
pub mod permissions;
pub mod queries;
pub mod services;
pub mod session;
pub mod shell;
pub mod utils;

// Re-export commonly used types
pub use client::ApiClient;
pub use config::Settings;
pub use utils::errors::{ConsoleError, Result};

// Re-export main components for easy access
pub use grid::{BulletinGrid, GridController};
pub use notify::{Notification, Notifier};
pub use permissions::{Permission, RolePermissions};
pub use queries::Queries;
pub use services::Services;
pub use session::Session;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
