//! Department (secondary organization) models

use serde::{Deserialize, Serialize};
use super::common::{id_string, opt_id_string};

/// Second-tier reporting entity belonging to an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub organization_id: Option<String>,
    /// Display name of the owning organization
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentCreate {
    pub name: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentUpdate {
    pub id: String,
    pub name: String,
    pub organization_id: String,
}
