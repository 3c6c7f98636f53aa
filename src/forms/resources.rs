//! Forms and table rows of the console resources

use std::collections::BTreeMap;
use std::sync::OnceLock;
use regex::Regex;
use crate::models::{
    Bulletin, BulletinColumn, BulletinCreateBody, BulletinDeadline, BulletinUpdateBody, Classificator,
    ClassificatorCreate, CreateUserRequest, Department, DepartmentCreate, DepartmentUpdate, Element,
    ElementCreate, LogItem, MainOrganization, Organization, OrganizationCreate, OrganizationType,
    OrganizationUpdate, UpdateUserRequest, UserData,
};
use crate::utils::helpers::role_label;
use super::field::{FieldCheck, FieldSpec, FieldValue};
use super::modal::{ModalMode, ResourceForm};
use super::table::TableRow;

fn username_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.@+-]+$").ok()).as_ref()
}

/// A main organization with the secondary organizations chosen under it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationSelection {
    pub main_id: String,
    pub secondary_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulletinForm {
    pub name: String,
    pub description: String,
    pub deadline: BulletinDeadline,
    pub columns: Vec<BulletinColumn>,
    pub organizations: Vec<OrganizationSelection>,
    pub responsible_employees: Vec<String>,
}

impl BulletinForm {
    pub fn main_ids(&self) -> Vec<String> {
        self.organizations.iter().map(|s| s.main_id.clone()).collect()
    }

    /// Every selected secondary organization, in selection order
    pub fn secondary_ids(&self) -> Vec<String> {
        self.organizations
            .iter()
            .flat_map(|s| s.secondary_ids.iter().cloned())
            .collect()
    }

    pub fn select_main(&mut self, main_id: &str) {
        if !self.organizations.iter().any(|s| s.main_id == main_id) {
            self.organizations.push(OrganizationSelection {
                main_id: main_id.to_string(),
                secondary_ids: Vec::new(),
            });
        }
    }

    /// Remove a main organization together with its secondary choices
    pub fn deselect_main(&mut self, main_id: &str) {
        self.organizations.retain(|s| s.main_id != main_id);
    }

    /// Toggle a secondary organization, selecting its main one if needed
    pub fn toggle_secondary(&mut self, main_id: &str, secondary_id: &str) {
        self.select_main(main_id);
        if let Some(selection) = self.organizations.iter_mut().find(|s| s.main_id == main_id) {
            if let Some(position) = selection.secondary_ids.iter().position(|id| id == secondary_id) {
                selection.secondary_ids.remove(position);
            } else {
                selection.secondary_ids.push(secondary_id.to_string());
            }
        }
    }

    /// Rebuild the nested organization list from lookup tables
    ///
    /// Names missing from the lookups are left empty.
    pub fn main_organizations_list(&self, organizations: &[Organization], departments: &[Department]) -> Vec<MainOrganization> {
        let organization_names: BTreeMap<&str, &str> =
            organizations.iter().map(|o| (o.id.as_str(), o.name.as_str())).collect();
        let departments_by_id: BTreeMap<&str, &Department> =
            departments.iter().map(|d| (d.id.as_str(), d)).collect();

        self.organizations
            .iter()
            .map(|selection| MainOrganization {
                id: selection.main_id.clone(),
                name: organization_names
                    .get(selection.main_id.as_str())
                    .map(|name| name.to_string())
                    .unwrap_or_default(),
                secondary_organizations: selection
                    .secondary_ids
                    .iter()
                    .filter_map(|id| departments_by_id.get(id.as_str()).map(|d| (*d).clone()))
                    .collect(),
            })
            .collect()
    }
}

impl ResourceForm for BulletinForm {
    type Entity = Bulletin;
    type Create = BulletinCreateBody;
    type Update = BulletinUpdateBody;

    const RESOURCE: &'static str = "bulletin";

    fn from_entity(bulletin: &Bulletin) -> Self {
        Self {
            name: bulletin.name.clone(),
            description: bulletin.description.clone(),
            deadline: bulletin.deadline.clone().unwrap_or_default(),
            columns: bulletin.sorted_columns(),
            organizations: bulletin
                .main_organizations_list
                .iter()
                .map(|main| OrganizationSelection {
                    main_id: main.id.clone(),
                    secondary_ids: main.secondary_organizations.iter().map(|d| d.id.clone()).collect(),
                })
                .collect(),
            responsible_employees: bulletin.employees_list.iter().map(|e| e.id.clone()).collect(),
        }
    }

    fn fields(&self, _mode: &ModalMode) -> Vec<FieldCheck<'_>> {
        vec![
            (
                FieldSpec::new("name").required("Byulleten nomini kiriting").max_length(255, "Nomi juda uzun"),
                FieldValue::Text(&self.name),
            ),
            (
                FieldSpec::new("period_type").required("Muddat turini tanlang"),
                FieldValue::Text(&self.deadline.period_type),
            ),
            (
                FieldSpec::new("main_organizations").non_empty("Kamida bitta tashkilotni tanlang"),
                FieldValue::Text(if self.organizations.is_empty() { "" } else { "selected" }),
            ),
            (
                FieldSpec::new("responsible_employees").non_empty("Kamida bitta mas'ul shaxsni tanlang"),
                FieldValue::Selection(&self.responsible_employees),
            ),
        ]
    }

    fn create_request(&self) -> BulletinCreateBody {
        BulletinCreateBody {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            deadline: self.deadline.clone(),
            columns: self.columns.clone(),
            organizations: self.secondary_ids(),
            main_organizations: self.main_ids(),
            responsible_employees: self.responsible_employees.clone(),
        }
    }

    fn update_request(&self, _id: &str) -> BulletinUpdateBody {
        self.create_request().into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationForm {
    pub name: String,
    pub org_type: Option<OrganizationType>,
    pub parent_id: Option<String>,
    pub is_active: bool,
}

impl Default for OrganizationForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            org_type: None,
            parent_id: None,
            is_active: true,
        }
    }
}

impl ResourceForm for OrganizationForm {
    type Entity = Organization;
    type Create = OrganizationCreate;
    type Update = OrganizationUpdate;

    const RESOURCE: &'static str = "organization";

    fn from_entity(organization: &Organization) -> Self {
        Self {
            name: organization.name.clone(),
            org_type: organization.org_type,
            parent_id: organization.parent.as_ref().map(|p| p.id().to_string()),
            is_active: organization.is_active.unwrap_or(true),
        }
    }

    fn fields(&self, _mode: &ModalMode) -> Vec<FieldCheck<'_>> {
        vec![(
            FieldSpec::new("name").required("Tashkilot nomini kiriting").max_length(255, "Nomi juda uzun"),
            FieldValue::Text(&self.name),
        )]
    }

    fn create_request(&self) -> OrganizationCreate {
        OrganizationCreate {
            name: self.name.trim().to_string(),
            parent_id: self.parent_id.clone(),
            children: None,
            is_active: Some(self.is_active),
            org_type: self.org_type,
        }
    }

    fn update_request(&self, id: &str) -> OrganizationUpdate {
        OrganizationUpdate {
            id: id.to_string(),
            name: Some(self.name.trim().to_string()),
            parent_id: self.parent_id.clone(),
            children: None,
            is_active: Some(self.is_active),
            org_type: self.org_type,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentForm {
    pub name: String,
    pub organization_id: String,
}

impl ResourceForm for DepartmentForm {
    type Entity = Department;
    type Create = DepartmentCreate;
    type Update = DepartmentUpdate;

    const RESOURCE: &'static str = "department";

    fn from_entity(department: &Department) -> Self {
        Self {
            name: department.name.clone(),
            organization_id: department.organization_id.clone().unwrap_or_default(),
        }
    }

    fn fields(&self, _mode: &ModalMode) -> Vec<FieldCheck<'_>> {
        vec![
            (
                FieldSpec::new("name").required("Quyi tashkilot nomini kiriting"),
                FieldValue::Text(&self.name),
            ),
            (
                FieldSpec::new("organization_id").required("Tashkilotni tanlang"),
                FieldValue::Text(&self.organization_id),
            ),
        ]
    }

    fn create_request(&self) -> DepartmentCreate {
        DepartmentCreate {
            name: self.name.trim().to_string(),
            organization_id: self.organization_id.clone(),
        }
    }

    fn update_request(&self, id: &str) -> DepartmentUpdate {
        DepartmentUpdate {
            id: id.to_string(),
            name: self.name.trim().to_string(),
            organization_id: self.organization_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub last_name: String,
    pub first_name: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub secondary_organization: String,
    pub is_active: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            last_name: String::new(),
            first_name: String::new(),
            username: String::new(),
            password: String::new(),
            role: String::new(),
            secondary_organization: String::new(),
            is_active: true,
        }
    }
}

impl ResourceForm for UserForm {
    type Entity = UserData;
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    const RESOURCE: &'static str = "user";

    fn from_entity(user: &UserData) -> Self {
        Self {
            last_name: user.last_name.clone(),
            first_name: user.first_name.clone(),
            username: user.username.clone(),
            // Never prefilled; blank keeps the current password
            password: String::new(),
            role: user.role.clone(),
            secondary_organization: user.secondary_organization_id().unwrap_or_default(),
            is_active: user.is_active,
        }
    }

    fn fields(&self, mode: &ModalMode) -> Vec<FieldCheck<'_>> {
        let mut password = FieldSpec::new("password").min_length(6, "Parol kamida 6 ta belgidan iborat bo'lishi kerak");
        if *mode == ModalMode::Create {
            password = FieldSpec::new("password")
                .required("Parol kiritilishi shart")
                .min_length(6, "Parol kamida 6 ta belgidan iborat bo'lishi kerak");
        }

        let mut username = FieldSpec::new("username")
            .required("Login kiritilishi shart")
            .max_length(150, "Login juda uzun");
        if let Some(pattern) = username_pattern() {
            username = username.pattern(pattern, "Login faqat harf, raqam va _.@+- belgilaridan iborat bo'lishi mumkin");
        }

        vec![
            (FieldSpec::new("last_name").required("Familiya kiritilishi shart"), FieldValue::Text(&self.last_name)),
            (FieldSpec::new("first_name").required("Ism kiritilishi shart"), FieldValue::Text(&self.first_name)),
            (username, FieldValue::Text(&self.username)),
            (password, FieldValue::Text(&self.password)),
            (FieldSpec::new("role").required("Rol tanlanishi shart"), FieldValue::Text(&self.role)),
            (
                FieldSpec::new("secondary_organization").required("Bo'lim tanlanishi shart"),
                FieldValue::Text(&self.secondary_organization),
            ),
        ]
    }

    fn create_request(&self) -> CreateUserRequest {
        CreateUserRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role: self.role.clone(),
            secondary_organization: Some(self.secondary_organization.clone()),
            is_active: self.is_active,
        }
    }

    fn update_request(&self, _id: &str) -> UpdateUserRequest {
        UpdateUserRequest {
            username: Some(self.username.trim().to_string()),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            role: Some(self.role.clone()),
            secondary_organization: Some(self.secondary_organization.clone()),
            is_active: Some(self.is_active),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificatorForm {
    pub name: String,
}

impl ResourceForm for ClassificatorForm {
    type Entity = Classificator;
    type Create = ClassificatorCreate;
    type Update = ClassificatorCreate;

    const RESOURCE: &'static str = "classificator";

    fn from_entity(classificator: &Classificator) -> Self {
        Self { name: classificator.name.clone() }
    }

    fn fields(&self, _mode: &ModalMode) -> Vec<FieldCheck<'_>> {
        vec![(
            FieldSpec::new("name").required("Klassifikator nomini kiriting"),
            FieldValue::Text(&self.name),
        )]
    }

    fn create_request(&self) -> ClassificatorCreate {
        ClassificatorCreate { name: self.name.trim().to_string() }
    }

    fn update_request(&self, _id: &str) -> ClassificatorCreate {
        self.create_request()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementForm {
    pub classificator: String,
    pub name: String,
    pub value: String,
}

impl ElementForm {
    /// Empty form bound to a classificator
    pub fn for_classificator(classificator_id: &str) -> Self {
        Self {
            classificator: classificator_id.to_string(),
            ..Self::default()
        }
    }
}

impl ResourceForm for ElementForm {
    type Entity = (String, Element);
    type Create = ElementCreate;
    type Update = ElementCreate;

    const RESOURCE: &'static str = "element";

    fn from_entity((classificator, element): &(String, Element)) -> Self {
        Self {
            classificator: classificator.clone(),
            name: element.name.clone(),
            value: element.value.clone().unwrap_or_default(),
        }
    }

    fn fields(&self, _mode: &ModalMode) -> Vec<FieldCheck<'_>> {
        vec![
            (FieldSpec::new("classificator").required("Klassifikator tanlanmagan"), FieldValue::Text(&self.classificator)),
            (FieldSpec::new("name").required("Element nomini kiriting"), FieldValue::Text(&self.name)),
        ]
    }

    fn create_request(&self) -> ElementCreate {
        let value = self.value.trim();
        ElementCreate {
            classificator: self.classificator.clone(),
            name: self.name.trim().to_string(),
            value: (!value.is_empty()).then(|| value.to_string()),
        }
    }

    fn update_request(&self, _id: &str) -> ElementCreate {
        self.create_request()
    }
}

impl TableRow for Bulletin {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    fn filter_value(&self, filter: &str) -> Option<String> {
        match filter {
            "period_type" => self.deadline.as_ref().map(|d| d.period_type.clone()),
            "author" => self.user_info.as_ref().map(|u| u.username.clone()),
            _ => None,
        }
    }
}

impl TableRow for Organization {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }

    fn filter_value(&self, filter: &str) -> Option<String> {
        match filter {
            "type" => self.org_type.map(|t| t.to_string()),
            "status" => Some(active_label(self.is_active.unwrap_or(true)).to_string()),
            _ => None,
        }
    }
}

impl TableRow for Department {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.organization.as_deref().unwrap_or_default())
    }

    fn filter_value(&self, filter: &str) -> Option<String> {
        match filter {
            "organization_id" => self.organization_id.clone(),
            "status" => Some(active_label(self.is_active.unwrap_or(true)).to_string()),
            _ => None,
        }
    }
}

impl TableRow for UserData {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {} {}", self.full_name(), self.username, role_label(&self.role))
    }

    fn filter_value(&self, filter: &str) -> Option<String> {
        match filter {
            "role" => Some(self.role.clone()),
            "status" => Some(active_label(self.is_active).to_string()),
            "secondary_organization" => self.secondary_organization_id(),
            _ => None,
        }
    }
}

impl TableRow for Classificator {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        self.name.clone()
    }
}

impl TableRow for Element {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!("{} {}", self.name, self.value.as_deref().unwrap_or_default())
    }
}

/// Activity log rows filter on the raw `user`, `content_type` and `action`
impl TableRow for LogItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.description.as_deref().unwrap_or_default(),
            self.actor(),
            self.content_label()
        )
    }

    fn filter_value(&self, filter: &str) -> Option<String> {
        match filter {
            "user" => self
                .user
                .clone()
                .or_else(|| self.user_info.as_ref().and_then(|info| info.id.clone())),
            "content_type" => self.content_type.clone(),
            "action" => Some(self.action.clone()),
            _ => None,
        }
    }
}

fn active_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::modal::{Modal, ModalState, Submission};
    use crate::notify::{MemoryNotifier, NotificationLevel};
    use crate::utils::errors::ConsoleError;
    use assert_matches::assert_matches;

    fn bulletin() -> Bulletin {
        serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "Oylik hisobot",
            "description": "",
            "deadline": {"period_type": "monthly", "interval": 1, "day_of_month": 5},
            "columns": [
                {"id": 2, "name": "Soni", "type": "number", "order": 2},
                {"id": 1, "name": "Nomi", "type": "text", "order": 1}
            ],
            "main_organizations_list": [
                {"id": "o1", "name": "Moliya vazirligi", "secondary_organizations": [
                    {"id": "d1", "name": "Buxgalteriya", "organization_id": "o1"},
                    {"id": "d2", "name": "Kadrlar", "organization_id": "o1"}
                ]},
                {"id": "o2", "name": "Statistika qo'mitasi", "secondary_organizations": []}
            ],
            "employees_list": [{"id": 7, "first_name": "Ali", "last_name": "Valiyev"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_bulletin_form_reconstructs_organization_tree() {
        let bulletin = bulletin();
        let form = BulletinForm::from_entity(&bulletin);

        let organizations: Vec<Organization> = bulletin
            .main_organizations_list
            .iter()
            .map(|main| {
                serde_json::from_value(serde_json::json!({"id": main.id, "name": main.name})).unwrap()
            })
            .collect();
        let departments: Vec<Department> = bulletin
            .main_organizations_list
            .iter()
            .flat_map(|main| main.secondary_organizations.clone())
            .collect();

        assert_eq!(form.main_organizations_list(&organizations, &departments), bulletin.main_organizations_list);

        let body = form.create_request();
        assert_eq!(body.main_organizations, vec!["o1", "o2"]);
        assert_eq!(body.organizations, vec!["d1", "d2"]);
        assert_eq!(body.responsible_employees, vec!["7"]);
        assert_eq!(body.columns[0].name, "Nomi");
    }

    #[test]
    fn test_deselecting_main_drops_its_departments() {
        let mut form = BulletinForm::from_entity(&bulletin());
        form.toggle_secondary("o2", "d9");
        form.deselect_main("o1");

        assert_eq!(form.main_ids(), vec!["o2"]);
        assert_eq!(form.secondary_ids(), vec!["d9"]);
    }

    #[test]
    fn test_user_password_required_only_on_create() {
        let form = UserForm {
            last_name: "Valiyev".to_string(),
            first_name: "Ali".to_string(),
            username: "ali".to_string(),
            role: "OPERATOR".to_string(),
            secondary_organization: "d1".to_string(),
            ..UserForm::default()
        };

        assert!(form.validate(&ModalMode::Create).contains_key("password"));
        assert!(form.validate(&ModalMode::Edit("1".to_string())).is_empty());
        assert_eq!(form.update_request("1").password, None);
    }

    #[test]
    fn test_modal_validation_blocks_submit() {
        let mut modal: Modal<DepartmentForm> = Modal::new();
        modal.open_create().unwrap();

        assert_matches!(modal.submit(), Err(ConsoleError::Validation(errors)) if errors.len() == 2);
        assert_matches!(modal.state(), ModalState::Open(ModalMode::Create));
        assert!(modal.errors().contains_key("organization_id"));
    }

    #[tokio::test]
    async fn test_modal_failure_keeps_form_open() {
        let notifier = MemoryNotifier::new();
        let mut modal: Modal<OrganizationForm> = Modal::new();
        modal.open_create().unwrap();
        modal.form_mut().unwrap().name = "Yangi tashkilot".to_string();

        let result: Result<(), ConsoleError> = modal
            .submit_with(&notifier, |submission| async move {
                assert_matches!(submission, Submission::Create(body) if body.name == "Yangi tashkilot");
                Err(ConsoleError::Api { status: 400, message: "duplicate name".to_string() })
            })
            .await;

        assert!(result.is_err());
        assert_matches!(modal.state(), ModalState::Open(ModalMode::Create));
        assert_eq!(modal.form().name, "Yangi tashkilot");
        let last = notifier.last().await.unwrap();
        assert_eq!(last.level, NotificationLevel::Error);
        assert_eq!(last.message, "duplicate name");
    }

    #[tokio::test]
    async fn test_modal_success_closes() {
        let notifier = MemoryNotifier::new();
        let mut modal: Modal<ClassificatorForm> = Modal::new();
        let existing = Classificator { id: "c1".to_string(), name: "Old".to_string(), elements: vec![] };
        modal.open_edit("c1", &existing).unwrap();
        assert_eq!(modal.form().name, "Old");
        modal.form_mut().unwrap().name = "New".to_string();

        let updated = modal
            .submit_with(&notifier, |submission| async move {
                match submission {
                    Submission::Update { id, body } => Ok((id, body.name)),
                    Submission::Create(_) => Err(ConsoleError::Config("unexpected".to_string())),
                }
            })
            .await
            .unwrap();

        assert_eq!(updated, ("c1".to_string(), "New".to_string()));
        assert_eq!(modal.state(), &ModalState::Closed);
        assert_eq!(notifier.last().await.unwrap().level, NotificationLevel::Success);
    }

    #[test]
    fn test_modal_cannot_close_while_submitting() {
        let mut modal: Modal<ClassificatorForm> = Modal::new();
        modal.open_create().unwrap();
        modal.form_mut().unwrap().name = "Hududlar".to_string();
        modal.submit().unwrap();

        assert_matches!(modal.close(), Err(ConsoleError::InvalidStateTransition { .. }));
        assert!(modal.form_mut().is_none());
        assert_matches!(modal.open_create(), Err(ConsoleError::InvalidStateTransition { .. }));
    }
}
