//! Activity log models
//!
//! Every API call the server audits is listed as a [`LogItem`]. The list is
//! paginated and filtered by actor, content type and action.

use std::fmt;
use serde::{Deserialize, Serialize};
use super::common::{id_string, opt_id_string};

/// Audited model kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    CustomUser,
    Classificator,
    Element,
    Organization,
    SecondaryOrganization,
    Journal,
    Column,
    RowValue,
    UploadedFile,
    JournalUploadHistory,
}

impl ContentType {
    pub const ALL: [ContentType; 10] = [
        ContentType::CustomUser,
        ContentType::Classificator,
        ContentType::Element,
        ContentType::Organization,
        ContentType::SecondaryOrganization,
        ContentType::Journal,
        ContentType::Column,
        ContentType::RowValue,
        ContentType::UploadedFile,
        ContentType::JournalUploadHistory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::CustomUser => "CustomUser",
            ContentType::Classificator => "Classificator",
            ContentType::Element => "Element",
            ContentType::Organization => "Organization",
            ContentType::SecondaryOrganization => "SecondaryOrganization",
            ContentType::Journal => "Journal",
            ContentType::Column => "Column",
            ContentType::RowValue => "RowValue",
            ContentType::UploadedFile => "UploadedFile",
            ContentType::JournalUploadHistory => "JournalUploadHistory",
        }
    }

    /// Label shown in the content filter
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::CustomUser => "Foydalanuvchi",
            ContentType::Classificator => "Classificator",
            ContentType::Element => "Element",
            ContentType::Organization => "Tashkilot",
            ContentType::SecondaryOrganization => "Quyi tashkilot",
            ContentType::Journal => "Bulleten",
            ContentType::Column => "Ustun",
            ContentType::RowValue => "Qator qiymati",
            ContentType::UploadedFile => "Fayl",
            ContentType::JournalUploadHistory => "Bulleten tarihi",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Get,
    Post,
    Update,
    Delete,
    Login,
    Logout,
}

impl LogAction {
    pub const ALL: [LogAction; 6] = [
        LogAction::Get,
        LogAction::Post,
        LogAction::Update,
        LogAction::Delete,
        LogAction::Login,
        LogAction::Logout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Get => "get",
            LogAction::Post => "post",
            LogAction::Update => "update",
            LogAction::Delete => "delete",
            LogAction::Login => "login",
            LogAction::Logout => "logout",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogAction::Get => "Get",
            LogAction::Post => "Yaratish",
            LogAction::Update => "Yangilash",
            LogAction::Delete => "O'chirish",
            LogAction::Login => "Tizimga kirish",
            LogAction::Logout => "Tizimdan chiqish",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == value)
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogUserInfo {
    #[serde(default, deserialize_with = "opt_id_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// One audited call
///
/// `action` and `content_type` stay plain strings so that kinds added on
/// the server still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogItem {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub user: Option<String>,
    #[serde(default)]
    pub user_info: Option<LogUserInfo>,
    pub action: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_type_verbose: Option<String>,
    pub created: String,
}

impl LogItem {
    /// Actor's full name, falling back to the raw user reference
    pub fn actor(&self) -> String {
        self.user_info
            .as_ref()
            .and_then(|info| info.full_name.clone())
            .or_else(|| self.user.clone())
            .unwrap_or_default()
    }

    /// Verbose content type, falling back to the model name
    pub fn content_label(&self) -> String {
        self.content_type_verbose
            .clone()
            .or_else(|| self.content_type.clone())
            .unwrap_or_default()
    }
}

/// Paging and filter parameters of the activity log
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogFilter {
    pub page: Option<u32>,
    pub user: Option<String>,
    pub content_type: Option<ContentType>,
    pub action: Option<LogAction>,
}

impl LogFilter {
    pub fn page(page: u32) -> Self {
        Self { page: Some(page), ..Self::default() }
    }

    /// Query string pairs in a stable order; unset filters are omitted
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(user) = self.user.as_deref().filter(|user| !user.is_empty()) {
            pairs.push(("user".to_string(), user.to_string()));
        }
        if let Some(content_type) = self.content_type {
            pairs.push(("content_type".to_string(), content_type.as_str().to_string()));
        }
        if let Some(action) = self.action {
            pairs.push(("action".to_string(), action.as_str().to_string()));
        }
        pairs
    }
}
