//! Mock administration API for testing
//!
//! Wraps a wiremock server mounted under `/api`, the prefix the console
//! joins every path onto.

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const API_PREFIX: &str = "/api";

/// Mock administration API server
pub struct ApiMockServer {
    pub server: MockServer,
}

impl ApiMockServer {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Base URL to put into the settings
    pub fn base_url(&self) -> String {
        format!("{}{}", self.server.uri(), API_PREFIX)
    }

    /// Absolute URL of an API path, as used in `next` links
    pub fn url(&self, api_path: &str) -> String {
        format!("{}{}", self.base_url(), api_path)
    }

    /// `GET` answering 200 with `body`
    pub async fn mock_get(&self, api_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(api_path_of(api_path)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Successful login for `login_body`
    pub async fn mock_login(&self, login_body: Value) {
        Mock::given(method("POST"))
            .and(path(api_path_of("/user/login/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body))
            .mount(&self.server)
            .await;
    }

    /// Bulletin detail of `bulletin`
    pub async fn mock_bulletin_detail(&self, bulletin: &Value) {
        let id = bulletin["id"].to_string().trim_matches('"').to_string();
        self.mock_get(&format!("/journal/{}/", id), bulletin.clone()).await;
    }

    /// Requests received so far for `method_name` on `api_path`
    pub async fn received(&self, method_name: &str, api_path: &str) -> usize {
        let full = api_path_of(api_path);
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == method_name && r.url.path() == full)
            .count()
    }
}

/// Prefixed path a mock matches on
pub fn api_path_of(api_path: &str) -> String {
    format!("{}{}", API_PREFIX, api_path)
}

/// List envelope around `results`
pub fn page(results: Value, next: Option<String>) -> Value {
    let count = results.as_array().map(Vec::len).unwrap_or(0);
    json!({
        "count": count,
        "next": next,
        "previous": null,
        "results": results,
    })
}
