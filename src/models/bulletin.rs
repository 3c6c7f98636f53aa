//! Bulletin (journal) models: definition, columns, rows and uploaded files

use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};
use super::common::{id_string, opt_id_string};
use super::department::Department;
use crate::utils::helpers::format_number;

/// Recurrence descriptor of a bulletin's submission deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinDeadline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub period_type: String,
    #[serde(default)]
    pub custom_deadline: Option<String>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub day_of_week: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_deadline: Option<String>,
}

fn default_interval() -> u32 {
    1
}

impl Default for BulletinDeadline {
    fn default() -> Self {
        Self {
            id: None,
            period_type: String::new(),
            custom_deadline: None,
            day_of_month: None,
            day_of_week: None,
            month: None,
            interval: default_interval(),
            period_start: None,
            current_deadline: None,
        }
    }
}

/// Value type of a bulletin column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Text,
    Date,
    Classificator,
    #[serde(other)]
    Other,
}

/// A typed field definition within a bulletin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinColumn {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub journal: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub classificator: Option<String>,
}

/// Main organization of a bulletin with its selected secondary organizations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainOrganization {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub secondary_organizations: Vec<Department>,
}

/// Responsible employee reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRef {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl EmployeeRef {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name).trim().to_string()
    }
}

/// Author of a bulletin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

/// A periodic data-collection form definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulletin {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub deadline: Option<BulletinDeadline>,
    #[serde(default)]
    pub columns: Vec<BulletinColumn>,
    #[serde(default)]
    pub main_organizations_list: Vec<MainOrganization>,
    #[serde(default)]
    pub employees_list: Vec<EmployeeRef>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    #[serde(default)]
    pub rows: Vec<BulletinRow>,
    #[serde(default)]
    pub files: Vec<BulletinFile>,
}

impl Bulletin {
    /// Columns in display order
    pub fn sorted_columns(&self) -> Vec<BulletinColumn> {
        let mut columns = self.columns.clone();
        columns.sort_by_key(|column| column.order);
        columns
    }
}

/// Body for creating a bulletin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinCreateBody {
    pub name: String,
    pub description: String,
    pub deadline: BulletinDeadline,
    pub columns: Vec<BulletinColumn>,
    pub organizations: Vec<String>,
    pub main_organizations: Vec<String>,
    pub responsible_employees: Vec<String>,
}

/// Partial body for updating a bulletin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletinUpdateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<BulletinDeadline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<BulletinColumn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_organizations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_employees: Option<Vec<String>>,
}

impl From<BulletinCreateBody> for BulletinUpdateBody {
    fn from(body: BulletinCreateBody) -> Self {
        Self {
            name: Some(body.name),
            description: Some(body.description),
            deadline: Some(body.deadline),
            columns: Some(body.columns),
            organizations: Some(body.organizations),
            main_organizations: Some(body.main_organizations),
            responsible_employees: Some(body.responsible_employees),
        }
    }
}

/// Scalar stored in a bulletin cell
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(text) if text.is_empty())
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            // integral numbers go out as integers
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                serializer.serialize_i64(*number as i64)
            }
            CellValue::Number(number) => serializer.serialize_f64(*number),
            CellValue::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(number) => write!(f, "{}", format_number(*number)),
            CellValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(number: f64) -> Self {
        CellValue::Number(number)
    }
}

/// One `{column, value}` pair of the row wire shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowValue {
    #[serde(deserialize_with = "id_string")]
    pub column: String,
    pub value: CellValue,
}

/// One data record submitted against a bulletin's columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default, deserialize_with = "row_values")]
    pub values: BTreeMap<String, CellValue>,
}

impl BulletinRow {
    /// Check if the row holds at least one non-empty value
    pub fn has_data(&self) -> bool {
        self.values.values().any(|value| !value.is_empty())
    }
}

/// Accept row values either as a map or as `[{column, value}]`
fn row_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, CellValue>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValues {
        Map(BTreeMap<String, Option<CellValue>>),
        List(Vec<RawRowValue>),
    }

    #[derive(Deserialize)]
    struct RawRowValue {
        #[serde(deserialize_with = "id_string")]
        column: String,
        value: Option<CellValue>,
    }

    let values = match Option::<RawValues>::deserialize(deserializer)? {
        Some(RawValues::Map(map)) => map
            .into_iter()
            .filter_map(|(column, value)| value.map(|value| (column, value)))
            .collect(),
        Some(RawValues::List(list)) => list
            .into_iter()
            .filter_map(|entry| entry.value.map(|value| (entry.column, value)))
            .collect(),
        None => BTreeMap::new(),
    };
    Ok(values)
}

/// Wire shape for creating or updating a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinCreateRow {
    pub journal: String,
    pub values: Vec<RowValue>,
}

impl BulletinCreateRow {
    /// Build the wire shape from a reconciled column map
    pub fn from_values(journal: &str, values: &BTreeMap<String, CellValue>) -> Self {
        Self {
            journal: journal.to_string(),
            values: values
                .iter()
                .filter(|(column, value)| !column.is_empty() && !value.is_empty())
                .map(|(column, value)| RowValue {
                    column: column.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

/// Submission status of a bulletin period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    OnTime,
    Late,
    NotSubmitted,
    #[serde(other)]
    Unknown,
}

impl FileStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::OnTime => "Vaqtida",
            FileStatus::Late => "Kechikkan",
            FileStatus::NotSubmitted => "Yuklanmagan",
            FileStatus::Unknown => "Noma'lum",
        }
    }
}

/// One uploaded version of a bulletin file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub upload_file: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub status_display: String,
}

impl UploadedFile {
    pub fn is_actual(&self) -> bool {
        self.status_display == "Actual"
    }
}

/// A bulletin submission slot with its upload history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletinFile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub status: FileStatus,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub uploaded_files: Vec<UploadedFile>,
}

impl BulletinFile {
    /// The current version of the upload, if any
    pub fn actual_file(&self) -> Option<&UploadedFile> {
        self.uploaded_files.iter().find(|file| file.is_actual())
    }

    /// Whether older versions exist besides the current one
    pub fn has_history(&self) -> bool {
        self.uploaded_files.len() > 1
    }
}

/// File content to send in a multipart upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), content }
    }
}

/// Edit of an uploaded file's permissions, optionally replacing the file
#[derive(Debug, Clone, PartialEq)]
pub struct BulletinFileUpdate {
    pub editable: bool,
    pub upload_file: Option<UploadFile>,
}

/// New version of an uploaded file with a change description
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatusHistoryRequest {
    pub upload_history_id: String,
    pub journal_id: String,
    pub description: String,
    pub upload_file: UploadFile,
}
