//! Shared harness for the HTTP integration tests.
//!
//! Every test gets its own migrated database from `#[sqlx::test]`; the app
//! is built with [`build_app_router`] so requests pass through the same
//! middleware stack as production.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use realms_api::auth::jwt::JwtConfig;
use realms_api::config::ServerConfig;
use realms_api::router::build_app_router;
use realms_api::state::AppState;

pub const TEST_PASSWORD: &str = "hunter2hunter2";

/// Test configuration with a fixed JWT secret and a generous rate limit.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        rate_limit_max_requests: 1_000,
        rate_limit_window_secs: 60,
        jwt: JwtConfig::with_secret("integration-test-secret"),
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_app_router(AppState::new(pool, config))
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, request("GET", uri, None, None)).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("GET", uri, Some(token), None)).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, request("POST", uri, None, Some(body))).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request("POST", uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("POST", uri, Some(token), None)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request("PUT", uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request("DELETE", uri, Some(token), None)).await
}

/// POST a raw text body, as the CSV import endpoint expects.
pub async fn post_text_auth(app: &Router, uri: &str, token: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and the error envelope's `code`.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) -> Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Register through the API and return the access token and user id.
pub async fn register(app: &Router, username: &str) -> (String, i64) {
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": username,
            "email": format!("{}@example.com", username.to_lowercase()),
            "password": TEST_PASSWORD,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["access_token"].as_str().unwrap().to_string(),
        json["user"]["id"].as_i64().unwrap(),
    )
}

pub async fn login(app: &Router, login: &str, password: &str) -> Response<Body> {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "login": login, "password": password }),
    )
    .await
}

/// Register a user, promote them to admin in the database and log in again
/// so the token carries the admin role.
pub async fn register_admin(app: &Router, pool: &PgPool, username: &str) -> (String, i64) {
    let (_, id) = register(app, username).await;
    sqlx::query(
        "UPDATE users SET role_id = (SELECT id FROM roles WHERE name = 'admin') WHERE id = $1",
    )
    .bind(id)
        .execute(pool)
        .await
        .unwrap();
    let response = login(app, username, TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    (json["access_token"].as_str().unwrap().to_string(), id)
}
