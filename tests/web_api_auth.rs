//! Web API Authentication Tests
//!
//! Login, session and logout over the embedded directory.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use common::{login, spawn_app, spawn_app_with, token, web_config, PASSWORD};
use s3nav::config::FolderSizeConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn test_login_returns_session() {
    let app = spawn_app().await;

    let body = login(&app.server, "writer", PASSWORD).await;
    assert_eq!(body["username"], "writer");
    assert_eq!(body["accessLevel"], "READ_WRITE");
    assert!(body["accessToken"].is_string());
    assert_eq!(body["expiresIn"], 8 * 60 * 60);

    let body = login(&app.server, "reader", PASSWORD).await;
    assert_eq!(body["accessLevel"], "READ_ONLY");
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "reader", "password": PASSWORD }))
        .await;
    response.assert_status_ok();

    let cookie = response.cookie("s3nav_session");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let app = spawn_app().await;

    for (username, password) in [("reader", "wrong-password"), ("nobody", PASSWORD)] {
        let response = app
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Invalid username or password");
    }
}

#[tokio::test]
async fn test_login_blank_fields_rejected() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "reader", "password": "  " }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_login_without_role_is_forbidden() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "outsider", "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_me_requires_authentication() {
    let app = spawn_app().await;

    app.server
        .get("/api/auth/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, "Bearer invalid-token")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_with_bearer_and_query_token() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "reader").await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "username": "reader", "accessLevel": "READ_ONLY" }));

    app.server
        .get("/api/auth/me")
        .add_query_param("token", &access_token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_me_with_session_cookie() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "writer").await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header("Cookie", format!("s3nav_session={}", access_token))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["accessLevel"], "READ_WRITE");
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = spawn_app().await;
    let access_token = token(&app.server, "reader").await;

    app.server
        .post("/api/auth/logout")
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", access_token))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = spawn_app().await;

    app.server
        .post("/api/auth/logout")
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_rate_limited() {
    let mut config = web_config();
    config.login_rate_limit = 2;
    let app = spawn_app_with(config, FolderSizeConfig::default()).await;

    for _ in 0..2 {
        app.server
            .post("/api/auth/login")
            .json(&json!({ "username": "reader", "password": "wrong-password" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "username": "reader", "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "TOO_MANY_REQUESTS");
}

#[tokio::test]
async fn test_health_and_security_headers() {
    let app = spawn_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");

    let response = app.server.get("/api/auth/me").await;
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
}
