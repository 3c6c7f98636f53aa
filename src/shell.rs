//! Layout shell: sidebar navigation and route guarding

use tracing::debug;
use crate::models::UserData;
use crate::permissions::{RolePermissions, Section};
use crate::session::Session;
use crate::utils::errors::Result;

pub const LOGIN_PATH: &str = "/login";

/// One sidebar link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub section: Section,
}

const NAV_ENTRIES: [NavEntry; 6] = [
    NavEntry { label: "Monitoring", path: "/", section: Section::Dashboard },
    NavEntry { label: "Foydalanuvchilar", path: "/users", section: Section::Users },
    NavEntry { label: "Quyi tashkilotlar", path: "/departments", section: Section::Departments },
    NavEntry { label: "Tashkilotlar", path: "/organizations", section: Section::Organizations },
    NavEntry { label: "Byulletenlar", path: "/bulletins", section: Section::Bulletins },
    NavEntry { label: "Klassifikatorlar", path: "/classificators", section: Section::Classificator },
];

/// Sidebar entries the user may open
pub fn navigation(table: &RolePermissions, user: Option<&UserData>) -> Vec<NavEntry> {
    NAV_ENTRIES
        .iter()
        .filter(|entry| table.can_access(user, entry.section))
        .copied()
        .collect()
}

/// Section a path belongs to
///
/// `/bulletins/{id}/detail` and `/bulletins/{id}/structure` have sections
/// of their own; classificator detail pages share the classificator list's.
pub fn section_for_path(path: &str) -> Option<Section> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => Some(Section::Dashboard),
        ["users"] => Some(Section::Users),
        ["departments"] => Some(Section::Departments),
        ["organizations"] => Some(Section::Organizations),
        ["bulletins"] => Some(Section::Bulletins),
        ["bulletins", _, "detail"] => Some(Section::BulletinDetail),
        ["bulletins", _, "structure"] => Some(Section::BulletinStructure),
        ["classificators"] | ["classificator", _] => Some(Section::Classificator),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    Forbidden,
}

/// Decides whether a page may be shown
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RolePermissions,
}

impl RouteGuard {
    pub fn new(table: RolePermissions) -> Self {
        Self { table }
    }

    /// Check `path` against the stored session
    ///
    /// The login page is always allowed. Paths outside the known sections
    /// are forbidden.
    pub async fn check(&self, session: &Session, path: &str) -> Result<RouteDecision> {
        if path == LOGIN_PATH {
            return Ok(RouteDecision::Allow);
        }

        let Some(state) = session.load().await? else {
            debug!(path = path, "No session, redirecting to login");
            return Ok(RouteDecision::RedirectToLogin);
        };

        let decision = match section_for_path(path) {
            Some(section) if self.table.can_access(Some(&state.user), section) => RouteDecision::Allow,
            _ => RouteDecision::Forbidden,
        };
        debug!(path = path, role = %state.user.role, decision = ?decision, "Route checked");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> UserData {
        serde_json::from_value(serde_json::json!({
            "id": 1, "role": role, "username": "u", "first_name": "A", "last_name": "B"
        }))
        .unwrap()
    }

    #[test]
    fn test_operator_navigation() {
        let entries = navigation(RolePermissions::builtin(), Some(&user("OPERATOR")));
        let paths: Vec<&str> = entries.iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["/", "/bulletins"]);
    }

    #[test]
    fn test_moderator_sees_everything() {
        assert_eq!(navigation(RolePermissions::builtin(), Some(&user("MODERATOR"))).len(), 6);
        assert!(navigation(RolePermissions::builtin(), None).is_empty());
        assert!(navigation(RolePermissions::builtin(), Some(&user("GUEST"))).is_empty());
    }

    #[test]
    fn test_section_for_path() {
        assert_eq!(section_for_path("/"), Some(Section::Dashboard));
        assert_eq!(section_for_path("/bulletins/12/detail"), Some(Section::BulletinDetail));
        assert_eq!(section_for_path("/bulletins/12/structure?tab=1"), Some(Section::BulletinStructure));
        assert_eq!(section_for_path("/classificator/4"), Some(Section::Classificator));
        assert_eq!(section_for_path("/settings"), None);
    }
}
