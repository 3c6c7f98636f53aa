//! Authentication service implementation
//!
//! Login against the user endpoint and local session bookkeeping.

use tracing::warn;
use crate::client::ApiClient;
use crate::models::{LoginCredentials, LoginResponse, UserData};
use crate::utils::errors::{ConsoleError, Result};
use crate::utils::logging::log_user_action;
use super::logged;

pub const LOGIN_PATH: &str = "/user/login/";

#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and persist the returned tokens and user
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(ConsoleError::Authentication("Username and password are required".to_string()));
        }

        let response: LoginResponse = logged(
            "auth.login",
            self.client.post_anonymous(LOGIN_PATH, credentials).await,
        )?;
        self.client.session().store_auth(&response).await?;

        log_user_action(&response.user_data.username, "login", Some(&response.user_data.role));
        Ok(response)
    }

    /// Forget the local session
    pub async fn logout(&self) -> Result<()> {
        let user = self.client.session().user().await?;
        self.client.session().clear().await?;
        if let Some(user) = user {
            log_user_action(&user.username, "logout", None);
        }
        Ok(())
    }

    /// The signed-in user of a valid session
    pub async fn current_user(&self) -> Result<Option<UserData>> {
        Ok(self.client.session().load().await?.map(|state| state.user))
    }

    pub async fn is_authenticated(&self) -> bool {
        match self.client.session().is_authenticated().await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                warn!(error = %e, "Session store unavailable");
                false
            }
        }
    }
}
