//! Query keys
//!
//! A key names the resource and the parameters of one read. Lists key on
//! their paging parameters, details on the entity id.

use std::fmt;
use crate::models::{LogFilter, PageParams};

/// Resource family of a cached read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Bulletins,
    BulletinDetail,
    Organizations,
    Departments,
    Users,
    UserDetail,
    Classificators,
    ClassificatorDetail,
    Monitoring,
    Logs,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Bulletins => "bulletins",
            Resource::BulletinDetail => "bulletin-detail",
            Resource::Organizations => "organizations",
            Resource::Departments => "departments",
            Resource::Users => "users",
            Resource::UserDetail => "user-detail",
            Resource::Classificators => "classificators",
            Resource::ClassificatorDetail => "classificator-detail",
            Resource::Monitoring => "monitoring",
            Resource::Logs => "logs",
        }
    }
}

/// Cache key of one read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub resource: Resource,
    pub params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn list(resource: Resource, params: &PageParams) -> Self {
        Self { resource, params: params.to_query() }
    }

    pub fn detail(resource: Resource, id: &str) -> Self {
        Self {
            resource,
            params: vec![("id".to_string(), id.to_string())],
        }
    }

    pub fn bulletins(params: &PageParams) -> Self {
        Self::list(Resource::Bulletins, params)
    }

    pub fn bulletin_detail(id: &str) -> Self {
        Self::detail(Resource::BulletinDetail, id)
    }

    pub fn classificator_detail(id: &str) -> Self {
        Self::detail(Resource::ClassificatorDetail, id)
    }

    pub fn user_detail(id: &str) -> Self {
        Self::detail(Resource::UserDetail, id)
    }

    /// Activity log page; every filter takes part in the key
    pub fn logs(filter: &LogFilter) -> Self {
        Self { resource: Resource::Logs, params: filter.to_query() }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.resource.as_str())?;
        for (name, value) in &self.params {
            write!(f, ", {}={}", name, value)?;
        }
        write!(f, "]")
    }
}
