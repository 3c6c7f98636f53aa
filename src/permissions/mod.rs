//! Permission module
//!
//! Role based gating of console sections and actions.

pub mod guard;
pub mod table;

pub use guard::{require_permission, PermissionGuard, Requirement};
pub use table::{Permission, RolePermissions, Section};
