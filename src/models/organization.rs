//! Organization models

use std::fmt;
use serde::{Deserialize, Serialize};
use super::common::id_string;
use super::department::Department;

/// Government organization category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrganizationType {
    #[serde(rename = "hukumat")]
    Hukumat,
    #[serde(rename = "vazirlik")]
    Vazirlik,
    #[serde(rename = "qo'mita")]
    Qomita,
    #[serde(rename = "Quyi tashkilot")]
    QuyiTashkilot,
    #[serde(rename = "agentlik")]
    Agentlik,
    #[serde(rename = "byuro")]
    Byuro,
}

impl OrganizationType {
    pub const ALL: [OrganizationType; 6] = [
        OrganizationType::Hukumat,
        OrganizationType::Vazirlik,
        OrganizationType::Qomita,
        OrganizationType::QuyiTashkilot,
        OrganizationType::Agentlik,
        OrganizationType::Byuro,
    ];

    /// Wire value of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationType::Hukumat => "hukumat",
            OrganizationType::Vazirlik => "vazirlik",
            OrganizationType::Qomita => "qo'mita",
            OrganizationType::QuyiTashkilot => "Quyi tashkilot",
            OrganizationType::Agentlik => "agentlik",
            OrganizationType::Byuro => "byuro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parent reference, sent either as an id or as a nested organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    Id(String),
    Nested(Box<Organization>),
}

impl ParentRef {
    pub fn id(&self) -> &str {
        match self {
            ParentRef::Id(id) => id,
            ParentRef::Nested(organization) => &organization.id,
        }
    }
}

/// First-tier reporting entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub org_type: Option<OrganizationType>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub secondary_organizations: Vec<Department>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub org_type: Option<OrganizationType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub org_type: Option<OrganizationType>,
}
