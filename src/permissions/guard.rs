//! Permission guards

use crate::models::UserData;
use crate::utils::errors::{ConsoleError, Result};
use super::table::{Permission, RolePermissions, Section};

/// What a guard checks
#[derive(Debug, Clone, PartialEq)]
pub enum Requirement {
    One(Permission),
    Any(Vec<Permission>),
    All(Vec<Permission>),
    Section(Section),
}

/// Yields content only when its requirement holds for the user
#[derive(Debug, Clone)]
pub struct PermissionGuard<'a> {
    table: &'a RolePermissions,
    requirement: Requirement,
}

impl<'a> PermissionGuard<'a> {
    pub fn new(table: &'a RolePermissions, requirement: Requirement) -> Self {
        Self { table, requirement }
    }

    pub fn permission(table: &'a RolePermissions, permission: Permission) -> Self {
        Self::new(table, Requirement::One(permission))
    }

    pub fn allows(&self, user: Option<&UserData>) -> bool {
        match &self.requirement {
            Requirement::One(permission) => self.table.has_permission(user, *permission),
            Requirement::Any(permissions) => self.table.has_any_permission(user, permissions),
            Requirement::All(permissions) => self.table.has_all_permissions(user, permissions),
            Requirement::Section(section) => self.table.can_access(user, *section),
        }
    }

    /// Build the content when allowed
    pub fn render<T>(&self, user: Option<&UserData>, content: impl FnOnce() -> T) -> Option<T> {
        self.allows(user).then(content)
    }

    /// Build the content when allowed, the fallback otherwise
    pub fn render_or<T>(&self, user: Option<&UserData>, content: impl FnOnce() -> T, fallback: impl FnOnce() -> T) -> T {
        if self.allows(user) {
            content()
        } else {
            fallback()
        }
    }
}

/// Fail with `PermissionDenied` unless the user holds `permission`
pub fn require_permission(table: &RolePermissions, user: Option<&UserData>, permission: Permission) -> Result<()> {
    if table.has_permission(user, permission) {
        Ok(())
    } else {
        Err(ConsoleError::PermissionDenied(permission.to_string()))
    }
}
