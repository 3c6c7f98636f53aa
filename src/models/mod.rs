//! Data models module
//!
//! This module contains the wire types of the administration API

pub mod common;
pub mod auth;
pub mod bulletin;
pub mod classificator;
pub mod department;
pub mod log;
pub mod monitoring;
pub mod organization;
pub mod user;

// Re-export commonly used models
pub use common::{Paginated, PageParams};
pub use auth::{LoginCredentials, LoginResponse, RefreshRequest, RefreshResponse};
pub use bulletin::{
    Bulletin, BulletinColumn, BulletinCreateBody, BulletinCreateRow, BulletinDeadline, BulletinFile,
    BulletinFileUpdate, BulletinRow, BulletinUpdateBody, CellValue, ColumnType, EmployeeRef, FileStatus,
    FileStatusHistoryRequest, MainOrganization, RowValue, UploadFile, UploadedFile, UserInfo,
};
pub use classificator::{Classificator, ClassificatorCreate, Element, ElementCreate};
pub use department::{Department, DepartmentCreate, DepartmentUpdate};
pub use log::{ContentType, LogAction, LogFilter, LogItem, LogUserInfo};
pub use monitoring::{MonitoringOrganization, MonitoringResults, SubmissionStats};
pub use organization::{Organization, OrganizationCreate, OrganizationType, OrganizationUpdate, ParentRef};
pub use user::{CreateUserRequest, UpdateUserRequest, UserData};
