//! Authenticated session on top of an [`AuthStore`]

use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, info, warn};
use crate::models::{LoginResponse, UserData};
use crate::utils::errors::Result;
use super::store::AuthStore;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";
pub const AUTH_EXPIRY_KEY: &str = "auth_expiry";

/// Snapshot of a valid session
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserData,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Session accessor shared by the client and the front end
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn AuthStore>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying its signature
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single()),
        Err(e) => {
            warn!(error = %e, "Failed to decode token expiry");
            None
        }
    }
}

impl Session {
    pub fn new(store: Arc<dyn AuthStore>) -> Self {
        Self { store }
    }

    /// Persist a successful login
    pub async fn store_auth(&self, response: &LoginResponse) -> Result<()> {
        let expires_at = token_expiry(&response.access);
        let ttl = ttl_until(expires_at);

        self.store.set(AUTH_TOKEN_KEY, &response.access, ttl).await?;
        self.store.set(REFRESH_TOKEN_KEY, &response.refresh, None).await?;
        self.store.set(USER_KEY, &serde_json::to_string(&response.user_data)?, None).await?;
        match expires_at {
            Some(expires_at) => self.store.set(AUTH_EXPIRY_KEY, &expires_at.to_rfc3339(), ttl).await?,
            None => self.store.remove(AUTH_EXPIRY_KEY).await?,
        }

        info!(username = %response.user_data.username, expires_at = ?expires_at, "Session stored");
        Ok(())
    }

    /// Replace the access token after a refresh
    pub async fn store_token(&self, access: &str, refresh: Option<&str>) -> Result<()> {
        let expires_at = token_expiry(access);
        let ttl = ttl_until(expires_at);

        self.store.set(AUTH_TOKEN_KEY, access, ttl).await?;
        if let Some(refresh) = refresh {
            self.store.set(REFRESH_TOKEN_KEY, refresh, None).await?;
        }
        if let Some(expires_at) = expires_at {
            self.store.set(AUTH_EXPIRY_KEY, &expires_at.to_rfc3339(), ttl).await?;
        }

        debug!(expires_at = ?expires_at, "Access token replaced");
        Ok(())
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.store.get(AUTH_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    /// The stored user; unreadable JSON counts as absent
    pub async fn user(&self) -> Result<Option<UserData>> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Stored user could not be parsed");
                Ok(None)
            }
        }
    }

    pub async fn expiry(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .store
            .get(AUTH_EXPIRY_KEY)
            .await?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|date| date.with_timezone(&Utc)))
    }

    /// Load a valid session, clearing one that has expired
    pub async fn load(&self) -> Result<Option<AuthState>> {
        let (Some(access_token), Some(user)) = (self.access_token().await?, self.user().await?) else {
            return Ok(None);
        };

        let expires_at = self.expiry().await?;
        if let Some(expiry) = expires_at {
            if expiry <= Utc::now() {
                info!(username = %user.username, "Session expired, clearing");
                self.clear().await?;
                return Ok(None);
            }
        }

        Ok(Some(AuthState {
            access_token,
            refresh_token: self.refresh_token().await?,
            user,
            expires_at,
        }))
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.load().await?.is_some())
    }

    /// Remove every session key
    pub async fn clear(&self) -> Result<()> {
        for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY, AUTH_EXPIRY_KEY] {
            self.store.remove(key).await?;
        }
        debug!("Session cleared");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

fn ttl_until(expires_at: Option<DateTime<Utc>>) -> Option<Duration> {
    expires_at.and_then(|expiry| (expiry - Utc::now()).to_std().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryAuthStore;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token_with_exp(exp: i64) -> String {
        encode(&Header::default(), &json!({"exp": exp, "user_id": 1}), &EncodingKey::from_secret(b"s")).unwrap()
    }

    fn login(access: String) -> LoginResponse {
        LoginResponse {
            user_data: UserData {
                id: "1".to_string(),
                role: "ADMIN".to_string(),
                first_name: "Ali".to_string(),
                last_name: "Valiyev".to_string(),
                username: "ali".to_string(),
                is_active: true,
                profile: serde_json::Value::Null,
            },
            access,
            refresh: "refresh".to_string(),
        }
    }

    #[test]
    fn test_token_expiry_decodes_exp() {
        let exp = Utc::now().timestamp() + 3600;
        assert_eq!(token_expiry(&token_with_exp(exp)).map(|d| d.timestamp()), Some(exp));
        assert!(token_expiry("not-a-token").is_none());
    }

    #[tokio::test]
    async fn test_store_and_load_session() {
        let session = Session::new(Arc::new(MemoryAuthStore::new()));
        assert!(!session.is_authenticated().await.unwrap());

        let token = token_with_exp(Utc::now().timestamp() + 3600);
        session.store_auth(&login(token.clone())).await.unwrap();

        let state = session.load().await.unwrap().unwrap();
        assert_eq!(state.access_token, token);
        assert_eq!(state.user.username, "ali");
        assert_eq!(state.refresh_token.as_deref(), Some("refresh"));
        assert!(state.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_expired_session_is_cleared() {
        let store = Arc::new(MemoryAuthStore::new());
        let session = Session::new(store.clone());
        session.store_auth(&login(token_with_exp(Utc::now().timestamp() - 10))).await.unwrap();

        assert!(!session.is_authenticated().await.unwrap());
        assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
        assert!(store.get(REFRESH_TOKEN_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_without_expiry_stays_valid() {
        let session = Session::new(Arc::new(MemoryAuthStore::new()));
        session.store_auth(&login("opaque".to_string())).await.unwrap();
        assert!(session.is_authenticated().await.unwrap());
        assert!(session.expiry().await.unwrap().is_none());
    }
}
