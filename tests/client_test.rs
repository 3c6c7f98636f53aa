//! API client integration tests: login, token refresh and list streaming

mod helpers;

use assert_matches::assert_matches;
use bulletin_console::models::{Department, LoginCredentials};
use bulletin_console::ConsoleError;
use futures::{pin_mut, StreamExt};
use helpers::*;
use serde_json::json;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, ResponseTemplate,
};

fn credentials() -> LoginCredentials {
    LoginCredentials {
        username: "ali".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_login_stores_session() {
    let ctx = TestContext::new().await;
    ctx.api.mock_login(login_json("ADMIN")).await;

    let response = ctx.services.auth.login(&credentials()).await.unwrap();
    assert_eq!(response.user_data.username, "ali");

    let state = ctx.session().load().await.unwrap().expect("session stored");
    assert_eq!(state.user.role, "ADMIN");
    assert_eq!(state.refresh_token.as_deref(), Some("refresh-token"));
    assert!(state.expires_at.is_some());
    assert!(ctx.services.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_logout_forgets_session() {
    let ctx = TestContext::signed_in("OPERATOR").await;
    assert!(ctx.services.auth.is_authenticated().await);

    ctx.services.auth.logout().await.unwrap();
    assert!(!ctx.services.auth.is_authenticated().await);
    assert!(ctx.services.auth.current_user().await.unwrap().is_none());

    // Logging out twice is harmless
    ctx.services.auth.logout().await.unwrap();
}

#[tokio::test]
async fn test_login_rejected_reports_detail() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/user/login/")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Login yoki parol noto'g'ri"})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;

    let result = ctx.services.auth.login(&credentials()).await;
    assert_matches!(result, Err(ConsoleError::Authentication(message)) if message == "Login yoki parol noto'g'ri");
    assert!(!ctx.services.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_empty_credentials_never_sent() {
    let ctx = TestContext::new().await;
    let result = ctx
        .services
        .auth
        .login(&LoginCredentials { username: " ".to_string(), password: String::new() })
        .await;

    assert!(result.is_err());
    assert_eq!(ctx.api.received("POST", "/user/login/").await, 0);
}

#[tokio::test]
async fn test_refresh_on_401_replays_once() {
    let ctx = TestContext::new().await;
    ctx.session().store_token("old-token", Some("refresh-1")).await.unwrap();

    Mock::given(method("GET"))
        .and(path(api_path_of("/journal/12/")))
        .and(header("Authorization", "Bearer old-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path_of("/journal/12/")))
        .and(header("Authorization", "Bearer new-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bulletin_json()))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/user/token/refresh/")))
        .and(body_json(json!({"refresh": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "new-token"})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;

    let bulletin = ctx.services.bulletins.detail("12").await.unwrap();
    assert_eq!(bulletin.name, "Oylik hisobot");
    assert_eq!(ctx.session().access_token().await.unwrap().as_deref(), Some("new-token"));
    assert_eq!(ctx.session().refresh_token().await.unwrap().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_second_401_clears_session() {
    let ctx = TestContext::signed_in("ADMIN").await;

    Mock::given(method("GET"))
        .and(path(api_path_of("/user/all/")))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&ctx.api.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/user/token/refresh/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "still-rejected"})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;

    let result = ctx.queries.users(&Default::default()).await;
    assert!(result.unwrap_err().is_auth_error());
    assert!(ctx.session().load().await.unwrap().is_none());
    assert!(ctx.session().access_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let ctx = TestContext::signed_in("ADMIN").await;

    Mock::given(method("GET"))
        .and(path(api_path_of("/journal/12/")))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/user/token/refresh/")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is invalid"})))
        .expect(1)
        .mount(&ctx.api.server)
        .await;

    let result = ctx.services.bulletins.detail("12").await;
    assert_matches!(result, Err(ConsoleError::Unauthorized));
    assert!(!ctx.services.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_stream_all_follows_next_links() {
    let ctx = TestContext::signed_in("ADMIN").await;
    let list_path = "/secondary-organizations/all/";

    Mock::given(method("GET"))
        .and(path(api_path_of(list_path)))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([{"id": 3, "name": "Kadrlar", "organization_id": 1}]),
            None,
        )))
        .expect(1)
        .mount(&ctx.api.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path_of(list_path)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            json!([
                {"id": 1, "name": "Buxgalteriya", "organization_id": 1},
                {"id": 2, "name": "Moliya", "organization_id": 1}
            ]),
            Some(format!("{}?page=2", ctx.api.url(list_path))),
        )))
        .expect(1)
        .mount(&ctx.api.server)
        .await;

    let stream = ctx.services.client.stream_all::<Department>(list_path, Vec::new());
    pin_mut!(stream);
    let mut names = Vec::new();
    while let Some(department) = stream.next().await {
        names.push(department.unwrap().name);
    }

    assert_eq!(names, vec!["Buxgalteriya", "Moliya", "Kadrlar"]);
}

#[tokio::test]
async fn test_field_errors_folded_into_message() {
    let ctx = TestContext::signed_in("ADMIN").await;
    Mock::given(method("POST"))
        .and(path(api_path_of("/organizations/create/")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"name": ["Bu maydon to'ldirilishi shart."]})))
        .mount(&ctx.api.server)
        .await;

    let body = bulletin_console::models::OrganizationCreate {
        name: String::new(),
        ..Default::default()
    };
    let result = ctx.services.organizations.create(&body).await;
    assert_matches!(
        result,
        Err(ConsoleError::Api { status: 400, message }) if message == "name: Bu maydon to'ldirilishi shart."
    );
}
