use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use monthplan::api::{create_router, AuthResponse, MeResponse};
use monthplan::config::AuthConfig;
use monthplan::db::Database;

fn test_auth() -> AuthConfig {
    AuthConfig {
        bcrypt_cost: 4,
        ..AuthConfig::with_secret("test-secret")
    }
}

fn server() -> TestServer {
    TestServer::new(create_router(Database::open_memory(), test_auth())).unwrap()
}

async fn register(server: &TestServer, email: &str, password: &str) -> AuthResponse {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": password, "fullName": "Ada" }))
        .await;
    response.assert_status_ok();
    response.json::<AuthResponse>()
}

#[tokio::test]
async fn register_then_me_returns_same_user() {
    let server = server();
    let registered = register(&server, "a@b.com", "secret1").await;
    assert_eq!(registered.user.email, "a@b.com");
    assert_eq!(registered.user.user_metadata.full_name.as_deref(), Some("Ada"));
    assert!(!registered.session.access_token.is_empty());

    let response = server
        .get("/api/auth/me")
        .authorization_bearer(&registered.session.access_token)
        .await;
    response.assert_status_ok();
    let me = response.json::<MeResponse>();
    assert_eq!(me.user.id, registered.user.id);
    assert_eq!(me.user.email, "a@b.com");
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let server = server();
    register(&server, "a@b.com", "secret1").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.com", "password": "other" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert!(response.json::<serde_json::Value>()["error"].is_string());
}

#[tokio::test]
async fn register_requires_email_and_password() {
    let server = server();
    server
        .post("/api/auth/register")
        .json(&json!({ "email": "a@b.com" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .post("/api/auth/register")
        .json(&json!({ "email": "", "password": "secret1" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_checks_password() {
    let server = server();
    let registered = register(&server, "a@b.com", "secret1").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "secret1" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<AuthResponse>().user.id, registered.user.id);

    server
        .post("/api/auth/login")
        .json(&json!({ "email": "a@b.com", "password": "wrong" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@b.com", "password": "secret1" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_rejects_missing_and_bad_tokens() {
    let server = server();
    server
        .get("/api/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/auth/me")
        .authorization_bearer("not-a-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let server = server();
    let foreign = monthplan::auth::issue_token(&AuthConfig::with_secret("other"), "u1").unwrap();
    server
        .get("/api/auth/me")
        .authorization_bearer(foreign)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() {
    let server = server();
    let ghost = monthplan::auth::issue_token(&test_auth(), "ghost").unwrap();
    let response = server
        .get("/api/auth/me")
        .authorization_bearer(ghost)
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert!(response.json::<serde_json::Value>()["error"].is_string());
}

#[tokio::test]
async fn logout_always_succeeds() {
    let server = server();
    let response = server.post("/api/auth/logout").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "success": true }));
}
