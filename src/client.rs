//! HTTP client for the administration API
//!
//! Wraps `reqwest` with base URL joining, bearer token injection, a
//! single refresh-and-replay on 401, an optional request rate limit and
//! mapping of API error bodies into [`ConsoleError`].

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use async_stream::try_stream;
use futures::Stream;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use crate::config::Settings;
use crate::models::{Paginated, RefreshRequest, RefreshResponse, UploadFile};
use crate::session::Session;
use crate::utils::errors::{ConsoleError, Result};
use crate::utils::logging::log_api_call;

pub const REFRESH_PATH: &str = "/user/token/refresh/";

/// One field of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text { name: String, value: String },
    File { name: String, file: UploadFile },
}

impl MultipartField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        MultipartField::Text { name: name.to_string(), value: value.into() }
    }

    pub fn file(name: &str, file: UploadFile) -> Self {
        MultipartField::File { name: name.to_string(), file }
    }
}

/// Request body kept in a replayable form
#[derive(Debug, Clone)]
enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone)]
struct ApiRequest {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    body: RequestBody,
    authenticated: bool,
}

/// List responses arrive either wrapped in the page envelope or as a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Page(Paginated<Vec<T>>),
    Bare(Vec<T>),
}

/// Authenticated API client
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Session,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new client from settings
    pub fn new(settings: &Settings, session: Session) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.api.timeout_seconds))
            .user_agent(settings.api.user_agent.as_str())
            .build()?;

        // Joining keeps the API prefix only when the base ends with a slash
        let mut base = settings.api.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let limiter = settings
            .api
            .max_requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));

        Ok(Self {
            http,
            base_url,
            session,
            limiter,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path, passing absolute URLs (page links) through
    pub fn url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let request = self.request(Method::GET, path, query, RequestBody::Empty, true)?;
        self.execute_json(request).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.request(Method::POST, path, &[], RequestBody::Json(serde_json::to_value(body)?), true)?;
        self.execute_json(request).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.request(Method::PATCH, path, &[], RequestBody::Json(serde_json::to_value(body)?), true)?;
        self.execute_json(request).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.request(Method::PUT, path, &[], RequestBody::Json(serde_json::to_value(body)?), true)?;
        self.execute_json(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path, &[], RequestBody::Empty, true)?;
        self.execute(request).await.map(|_| ())
    }

    /// Send a multipart form with the given method
    pub async fn multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        fields: Vec<MultipartField>,
    ) -> Result<T> {
        let request = self.request(method, path, &[], RequestBody::Multipart(fields), true)?;
        self.execute_json(request).await
    }

    /// POST without the bearer token and without the refresh cycle
    pub async fn post_anonymous<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.request(Method::POST, path, &[], RequestBody::Json(serde_json::to_value(body)?), false)?;
        self.execute_json(request).await
    }

    /// Fetch one list page, accepting the envelope or a bare array
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Paginated<Vec<T>>> {
        Ok(match self.get::<ListBody<T>>(path, query).await? {
            ListBody::Page(page) => page,
            ListBody::Bare(items) => Paginated::single_page(items),
        })
    }

    /// Stream every item of a list, following `next` links
    pub fn stream_all<T>(&self, path: &str, query: Vec<(String, String)>) -> impl Stream<Item = Result<T>> + '_
    where
        T: DeserializeOwned + 'static,
    {
        let path = path.to_string();
        try_stream! {
            let mut page = self.get_list::<T>(&path, &query).await?;
            loop {
                let next = page.next.take();
                for item in page.results {
                    yield item;
                }
                match next {
                    Some(link) => {
                        debug!(link = %link, "Following next page");
                        page = self.get_list::<T>(&link, &[]).await?;
                    }
                    None => break,
                }
            }
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: RequestBody,
        authenticated: bool,
    ) -> Result<ApiRequest> {
        Ok(ApiRequest {
            method,
            url: self.url(path)?,
            query: query.to_vec(),
            body,
            authenticated,
        })
    }

    async fn execute_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let text = self.execute(request).await?;
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Send a request, refreshing the access token once on 401
    async fn execute(&self, request: ApiRequest) -> Result<String> {
        if !request.authenticated {
            let response = self.dispatch(&request, None).await?;
            return read_response(&request, response).await;
        }

        let token = self.session.access_token().await?;
        let response = self.dispatch(&request, token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return read_response(&request, response).await;
        }

        debug!(path = request.url.path(), "Access token rejected, refreshing");
        let fresh = match self.refresh_access_token(token.as_deref()).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                self.session.clear().await?;
                return Err(ConsoleError::Unauthorized);
            }
        };

        let retry = self.dispatch(&request, Some(&fresh)).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path = request.url.path(), "Request rejected after refresh, clearing session");
            self.session.clear().await?;
            return Err(ConsoleError::Unauthorized);
        }
        read_response(&request, retry).await
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Concurrent 401s share one refresh: a caller that finds the stored
    /// token already replaced uses the replacement.
    async fn refresh_access_token(&self, rejected: Option<&str>) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.session.access_token().await? {
            if Some(current.as_str()) != rejected {
                return Ok(current);
            }
        }

        let refresh = self
            .session
            .refresh_token()
            .await?
            .ok_or(ConsoleError::Unauthorized)?;

        let request = self.request(
            Method::POST,
            REFRESH_PATH,
            &[],
            RequestBody::Json(serde_json::to_value(RefreshRequest { refresh })?),
            false,
        )?;
        let raw = self.dispatch(&request, None).await?;
        let response: RefreshResponse = serde_json::from_str(&read_response(&request, raw).await?)?;
        self.session
            .store_token(&response.access, response.refresh.as_deref())
            .await?;

        info!("Access token refreshed");
        Ok(response.access)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let mut builder = self.http.request(request.method.clone(), request.url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)),
        };

        let started = Instant::now();
        match builder.send().await {
            Ok(response) => {
                log_api_call(
                    request.method.as_str(),
                    request.url.path(),
                    response.status().as_u16(),
                    started.elapsed().as_millis() as u64,
                );
                Ok(response)
            }
            Err(e) => {
                if e.is_timeout() {
                    warn!(path = request.url.path(), "API request timed out");
                } else if e.is_connect() {
                    warn!(path = request.url.path(), "API connection failed");
                }
                Err(ConsoleError::Http(e))
            }
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("rate_limited", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn build_form(fields: &[MultipartField]) -> Form {
    fields.iter().fold(Form::new(), |form, field| match field {
        MultipartField::Text { name, value } => form.text(name.clone(), value.clone()),
        MultipartField::File { name, file } => form.part(
            name.clone(),
            Part::bytes(file.content.clone()).file_name(file.file_name.clone()),
        ),
    })
}

async fn read_response(request: &ApiRequest, response: Response) -> Result<String> {
    let status = response.status();
    let text = response.text().await?;
    if status.is_success() {
        return Ok(text);
    }

    let message = error_message(&text)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
    debug!(path = request.url.path(), status = status.as_u16(), message = %message, "API returned an error");

    Err(match status {
        StatusCode::UNAUTHORIZED if request.authenticated => ConsoleError::Unauthorized,
        StatusCode::UNAUTHORIZED => ConsoleError::Authentication(message),
        StatusCode::FORBIDDEN => ConsoleError::Forbidden(message),
        StatusCode::NOT_FOUND => ConsoleError::NotFound(message),
        other => ConsoleError::Api { status: other.as_u16(), message },
    })
}

/// Fold an API error body into one line
///
/// Understands `{"message": ..}`, `{"detail": ..}` and field error maps of
/// the form `{"field": ["msg", ..]}`.
pub fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return Some(crate::utils::helpers::truncate_text(trimmed, 200)),
    };

    match &value {
        serde_json::Value::Object(map) => {
            for key in ["message", "detail", "error"] {
                if let Some(text) = map.get(key).and_then(flatten_messages) {
                    return Some(text);
                }
            }
            let fields: Vec<String> = map
                .iter()
                .filter_map(|(field, messages)| {
                    flatten_messages(messages).map(|text| {
                        if field == "non_field_errors" {
                            text
                        } else {
                            format!("{}: {}", field, text)
                        }
                    })
                })
                .collect();
            (!fields.is_empty()).then(|| fields.join("; "))
        }
        other => flatten_messages(other),
    }
}

fn flatten_messages(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) if !text.is_empty() => Some(text.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_messages).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryAuthStore;

    fn client(base_url: &str) -> ApiClient {
        let mut settings = Settings::default();
        settings.api.base_url = base_url.to_string();
        ApiClient::new(&settings, Session::new(Arc::new(MemoryAuthStore::new()))).unwrap()
    }

    #[test]
    fn test_url_keeps_api_prefix() {
        let api = client("http://localhost:8000/api");
        assert_eq!(api.url("/journal/all/").unwrap().as_str(), "http://localhost:8000/api/journal/all/");

        let api = client("http://localhost:8000/api/");
        assert_eq!(api.url("user/1/").unwrap().as_str(), "http://localhost:8000/api/user/1/");
    }

    #[test]
    fn test_url_passes_absolute_links() {
        let api = client("http://localhost:8000/api");
        let link = "http://localhost:8000/api/journal/all/?page=2";
        assert_eq!(api.url(link).unwrap().as_str(), link);
    }

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(error_message(r#"{"message": "Journal not found"}"#).as_deref(), Some("Journal not found"));
        assert_eq!(error_message(r#"{"detail": "Token expired"}"#).as_deref(), Some("Token expired"));
        assert_eq!(
            error_message(r#"{"name": ["This field is required."], "non_field_errors": ["Duplicate"]}"#).as_deref(),
            Some("name: This field is required.; Duplicate")
        );
        assert_eq!(error_message("Bad Gateway").as_deref(), Some("Bad Gateway"));
        assert!(error_message("  ").is_none());
    }
}
