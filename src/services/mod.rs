//! Services module
//!
//! One service per REST resource. Services map requests to responses on
//! top of [`ApiClient`] and log failures before handing them back.

pub mod auth;
pub mod bulletin;
pub mod classificator;
pub mod department;
pub mod log;
pub mod monitoring;
pub mod organization;
pub mod user;

// Re-export commonly used services
pub use auth::AuthService;
pub use bulletin::BulletinService;
pub use classificator::ClassificatorService;
pub use department::DepartmentService;
pub use log::LogService;
pub use monitoring::MonitoringService;
pub use organization::OrganizationService;
pub use user::UserService;

use crate::client::ApiClient;
use crate::config::settings::Settings;
use crate::session::{build_store, Session};
use crate::utils::errors::Result;
use crate::utils::logging::{log_api_error, log_mutation};

/// Service factory for creating and managing all services
#[derive(Clone, Debug)]
pub struct Services {
    pub client: ApiClient,
    pub auth: AuthService,
    pub bulletins: BulletinService,
    pub organizations: OrganizationService,
    pub departments: DepartmentService,
    pub users: UserService,
    pub classificators: ClassificatorService,
    pub monitoring: MonitoringService,
    pub logs: LogService,
}

impl Services {
    /// Create all services over one shared client
    pub fn new(settings: &Settings, session: Session) -> Result<Self> {
        let client = ApiClient::new(settings, session)?;

        Ok(Self {
            auth: AuthService::new(client.clone()),
            bulletins: BulletinService::new(client.clone()),
            organizations: OrganizationService::new(client.clone()),
            departments: DepartmentService::new(client.clone()),
            users: UserService::new(client.clone()),
            classificators: ClassificatorService::new(client.clone()),
            monitoring: MonitoringService::new(client.clone()),
            logs: LogService::new(client.clone()),
            client,
        })
    }

    /// Create all services with the session store named in the settings
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let store = build_store(&settings.session).await?;
        Self::new(settings, Session::new(store))
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }
}

/// Percent-encode one path segment
pub(crate) fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

/// Log a failed call and pass the result through
pub(crate) fn logged<T>(operation: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        log_api_error(operation, e);
    }
    result
}

/// Log a mutation outcome and pass the result through
pub(crate) fn mutated<T>(resource: &str, action: &str, id: Option<&str>, result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => log_mutation(resource, action, id),
        Err(e) => log_api_error(&format!("{}.{}", resource, action), e),
    }
    result
}
