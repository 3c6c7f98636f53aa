//! Permission names, the role table and section mapping

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::config::PermissionsConfig;
use crate::models::UserData;
use crate::utils::errors::{ConsoleError, Result};

/// Capability name checked by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    ViewUsers,
    CreateUser,
    EditUser,
    DeleteUser,
    ViewDepartments,
    CreateDepartment,
    EditDepartment,
    DeleteDepartment,
    ViewOrganizations,
    CreateOrganization,
    EditOrganization,
    DeleteOrganization,
    ViewJournals,
    CreateJournal,
    EditJournal,
    DeleteJournal,
    ViewJournalDetail,
    CreateJournalRow,
    EditJournalRow,
    DeleteJournalRow,
    ViewBulletinFiles,
    CreateBulletinFile,
    DeleteBulletinFile,
    ViewJournalStructure,
    CreateJournalStructure,
    EditJournalStructure,
    DeleteJournalStructure,
    ViewClassificators,
    CreateClassificator,
    EditClassificator,
    DeleteClassificator,
}

impl Permission {
    pub const ALL: [Permission; 32] = [
        Permission::ViewDashboard,
        Permission::ViewUsers,
        Permission::CreateUser,
        Permission::EditUser,
        Permission::DeleteUser,
        Permission::ViewDepartments,
        Permission::CreateDepartment,
        Permission::EditDepartment,
        Permission::DeleteDepartment,
        Permission::ViewOrganizations,
        Permission::CreateOrganization,
        Permission::EditOrganization,
        Permission::DeleteOrganization,
        Permission::ViewJournals,
        Permission::CreateJournal,
        Permission::EditJournal,
        Permission::DeleteJournal,
        Permission::ViewJournalDetail,
        Permission::CreateJournalRow,
        Permission::EditJournalRow,
        Permission::DeleteJournalRow,
        Permission::ViewBulletinFiles,
        Permission::CreateBulletinFile,
        Permission::DeleteBulletinFile,
        Permission::ViewJournalStructure,
        Permission::CreateJournalStructure,
        Permission::EditJournalStructure,
        Permission::DeleteJournalStructure,
        Permission::ViewClassificators,
        Permission::CreateClassificator,
        Permission::EditClassificator,
        Permission::DeleteClassificator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewDashboard => "view_dashboard",
            Permission::ViewUsers => "view_users",
            Permission::CreateUser => "create_user",
            Permission::EditUser => "edit_user",
            Permission::DeleteUser => "delete_user",
            Permission::ViewDepartments => "view_departments",
            Permission::CreateDepartment => "create_department",
            Permission::EditDepartment => "edit_department",
            Permission::DeleteDepartment => "delete_department",
            Permission::ViewOrganizations => "view_organizations",
            Permission::CreateOrganization => "create_organization",
            Permission::EditOrganization => "edit_organization",
            Permission::DeleteOrganization => "delete_organization",
            Permission::ViewJournals => "view_journals",
            Permission::CreateJournal => "create_journal",
            Permission::EditJournal => "edit_journal",
            Permission::DeleteJournal => "delete_journal",
            Permission::ViewJournalDetail => "view_journal_detail",
            Permission::CreateJournalRow => "create_journal_row",
            Permission::EditJournalRow => "edit_journal_row",
            Permission::DeleteJournalRow => "delete_journal_row",
            Permission::ViewBulletinFiles => "view_bulletin_files",
            Permission::CreateBulletinFile => "create_bulletin_file",
            Permission::DeleteBulletinFile => "delete_bulletin_file",
            Permission::ViewJournalStructure => "view_journal_structure",
            Permission::CreateJournalStructure => "create_journal_structure",
            Permission::EditJournalStructure => "edit_journal_structure",
            Permission::DeleteJournalStructure => "delete_journal_structure",
            Permission::ViewClassificators => "view_classificators",
            Permission::CreateClassificator => "create_classificator",
            Permission::EditClassificator => "edit_classificator",
            Permission::DeleteClassificator => "delete_classificator",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|permission| permission.as_str() == name)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Console area guarded by one permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Dashboard,
    Users,
    Departments,
    Organizations,
    Bulletins,
    Classificator,
    BulletinDetail,
    BulletinStructure,
}

impl Section {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "dashboard" => Some(Section::Dashboard),
            "users" => Some(Section::Users),
            "departments" => Some(Section::Departments),
            "organizations" => Some(Section::Organizations),
            "bulletins" => Some(Section::Bulletins),
            "classificator" => Some(Section::Classificator),
            "bulletin_detail" => Some(Section::BulletinDetail),
            "bulletin_structure" => Some(Section::BulletinStructure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Users => "users",
            Section::Departments => "departments",
            Section::Organizations => "organizations",
            Section::Bulletins => "bulletins",
            Section::Classificator => "classificator",
            Section::BulletinDetail => "bulletin_detail",
            Section::BulletinStructure => "bulletin_structure",
        }
    }

    /// Permission required to enter the section
    pub fn permission(&self) -> Permission {
        match self {
            Section::Dashboard => Permission::ViewDashboard,
            Section::Users => Permission::ViewUsers,
            Section::Departments => Permission::ViewDepartments,
            Section::Organizations => Permission::ViewOrganizations,
            Section::Bulletins => Permission::ViewJournals,
            Section::Classificator => Permission::ViewClassificators,
            Section::BulletinDetail => Permission::ViewJournalDetail,
            Section::BulletinStructure => Permission::ViewJournalStructure,
        }
    }
}

/// TOML layout of a replacement role table
#[derive(Debug, Deserialize)]
struct RoleTableFile {
    roles: HashMap<String, Vec<Permission>>,
}

/// Immutable mapping from role name to granted permissions
#[derive(Debug, Clone, PartialEq)]
pub struct RolePermissions {
    roles: HashMap<String, HashSet<Permission>>,
}

impl RolePermissions {
    pub fn new(roles: HashMap<String, HashSet<Permission>>) -> Self {
        Self { roles }
    }

    /// Parse a table of the form `[roles]\nADMIN = ["view_dashboard", ...]`
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RoleTableFile = toml::from_str(content)
            .map_err(|e| ConsoleError::Config(format!("Invalid permission table: {}", e)))?;

        Ok(Self::new(
            file.roles
                .into_iter()
                .map(|(role, permissions)| (role, permissions.into_iter().collect()))
                .collect(),
        ))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let table = Self::from_toml_str(&content)?;
        info!(path = %path.as_ref().display(), roles = table.roles.len(), "Permission table loaded");
        Ok(table)
    }

    /// The configured table, or the built-in one
    pub fn from_config(config: &PermissionsConfig) -> Result<Self> {
        match &config.table_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Shared built-in table
    pub fn builtin() -> &'static RolePermissions {
        static TABLE: OnceLock<RolePermissions> = OnceLock::new();
        TABLE.get_or_init(RolePermissions::default)
    }

    /// Permissions granted to a role; unknown roles get none
    pub fn permissions_for(&self, role: &str) -> HashSet<Permission> {
        self.roles.get(role).cloned().unwrap_or_default()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn has_permission(&self, user: Option<&UserData>, permission: Permission) -> bool {
        let Some(user) = user else {
            return false;
        };
        let granted = self
            .roles
            .get(&user.role)
            .map(|permissions| permissions.contains(&permission))
            .unwrap_or(false);
        debug!(role = %user.role, permission = %permission, granted = granted, "Permission check");
        granted
    }

    pub fn has_any_permission(&self, user: Option<&UserData>, permissions: &[Permission]) -> bool {
        user.is_some() && permissions.iter().any(|p| self.has_permission(user, *p))
    }

    /// True when every permission is granted; false for an absent user
    pub fn has_all_permissions(&self, user: Option<&UserData>, permissions: &[Permission]) -> bool {
        user.is_some() && permissions.iter().all(|p| self.has_permission(user, *p))
    }

    pub fn can_access(&self, user: Option<&UserData>, section: Section) -> bool {
        self.has_permission(user, section.permission())
    }

    /// Section check by name; unknown names are never accessible
    pub fn can_access_section(&self, user: Option<&UserData>, section: &str) -> bool {
        Section::parse(section)
            .map(|section| self.can_access(user, section))
            .unwrap_or(false)
    }
}

impl Default for RolePermissions {
    fn default() -> Self {
        use Permission::*;

        let operator = vec![
            ViewDashboard,
            ViewJournals,
            ViewJournalDetail,
            CreateBulletinFile,
            ViewBulletinFiles,
            DeleteBulletinFile,
        ];
        // Administrators manage everything except bulletin file uploads
        let admin: Vec<Permission> = Permission::ALL
            .into_iter()
            .filter(|p| !matches!(p, CreateBulletinFile | DeleteBulletinFile))
            .collect();
        let full: Vec<Permission> = Permission::ALL.to_vec();

        let mut roles = HashMap::new();
        roles.insert("ADMIN".to_string(), admin.into_iter().collect());
        roles.insert("MODERATOR".to_string(), full.iter().copied().collect());
        roles.insert("OBSERVER".to_string(), full.into_iter().collect());
        roles.insert("OPERATOR".to_string(), operator.into_iter().collect());
        Self { roles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> UserData {
        UserData {
            id: "1".to_string(),
            role: role.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            username: "u".to_string(),
            is_active: true,
            profile: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_permission_names_round_trip() {
        for permission in Permission::ALL {
            assert_eq!(Permission::parse(permission.as_str()), Some(permission));
            let json = serde_json::to_string(&permission).unwrap();
            assert_eq!(json, format!("\"{}\"", permission.as_str()));
        }
    }

    #[test]
    fn test_builtin_table() {
        let table = RolePermissions::default();
        let admin = user("ADMIN");
        let operator = user("OPERATOR");

        assert!(table.has_permission(Some(&admin), Permission::DeleteUser));
        assert!(!table.has_permission(Some(&admin), Permission::CreateBulletinFile));
        assert!(table.has_permission(Some(&operator), Permission::CreateBulletinFile));
        assert!(!table.has_permission(Some(&operator), Permission::ViewUsers));
        assert_eq!(table.permissions_for("MODERATOR").len(), 32);
    }

    #[test]
    fn test_unknown_role_and_absent_user() {
        let table = RolePermissions::default();
        let guest = user("GUEST");

        for permission in Permission::ALL {
            assert!(!table.has_permission(Some(&guest), permission));
            assert!(!table.has_permission(None, permission));
        }
        assert!(!table.has_all_permissions(None, &[]));
        assert!(!table.has_any_permission(Some(&guest), &[Permission::ViewDashboard]));
    }

    #[test]
    fn test_sections() {
        let table = RolePermissions::default();
        let operator = user("OPERATOR");

        assert!(table.can_access_section(Some(&operator), "dashboard"));
        assert!(table.can_access_section(Some(&operator), "bulletin_detail"));
        assert!(!table.can_access_section(Some(&operator), "bulletin_structure"));
        assert!(!table.can_access_section(Some(&user("ADMIN")), "reports"));
    }

    #[test]
    fn test_toml_table_replaces_builtin() {
        let table = RolePermissions::from_toml_str(
            r#"
            [roles]
            AUDITOR = ["view_dashboard", "view_journals"]
            "#,
        )
        .unwrap();

        assert!(table.has_permission(Some(&user("AUDITOR")), Permission::ViewJournals));
        assert!(!table.has_permission(Some(&user("ADMIN")), Permission::ViewDashboard));
        assert!(RolePermissions::from_toml_str("[roles]\nX = [\"fly\"]").is_err());
    }
}
