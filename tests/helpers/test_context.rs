//! Test context for unified test setup
//!
//! Builds settings pointing at a fresh mock API, an in-memory session and
//! the services, query layer and notifier on top of them.

use std::sync::Arc;
use serde_json::Value;
use bulletin_console::{
    config::{SessionConfig, Settings},
    models::LoginResponse,
    notify::MemoryNotifier,
    queries::Queries,
    services::Services,
    session::Session,
};

use super::{api_mock::ApiMockServer, test_data::login_json};

/// Unified test context that manages all test components
pub struct TestContext {
    pub api: ApiMockServer,
    pub settings: Settings,
    pub services: Services,
    pub queries: Queries,
    pub notifier: Arc<MemoryNotifier>,
}

impl TestContext {
    /// Context with no signed-in user
    pub async fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let api = ApiMockServer::new().await;
        let settings = test_settings(&api);
        let services = Services::from_settings(&settings).await.unwrap();
        let queries = Queries::new(services.clone(), &settings.cache);

        Self {
            api,
            settings,
            services,
            queries,
            notifier: Arc::new(MemoryNotifier::new()),
        }
    }

    /// Context with a stored session for a user with `role`
    pub async fn signed_in(role: &str) -> Self {
        let ctx = Self::new().await;
        ctx.store_login(login_json(role)).await;
        ctx
    }

    pub async fn store_login(&self, login: Value) {
        let response: LoginResponse = serde_json::from_value(login).unwrap();
        self.session().store_auth(&response).await.unwrap();
    }

    pub fn session(&self) -> &Session {
        self.services.session()
    }
}

/// Settings against `api` with fast retries
pub fn test_settings(api: &ApiMockServer) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = api.base_url();
    settings.api.timeout_seconds = 5;
    settings.session = SessionConfig::Memory;
    settings.cache.retry_base_delay_ms = 5;
    settings.cache.retry_max_delay_ms = 20;
    settings
}
