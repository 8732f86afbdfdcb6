//! Error envelope, auth rejections and rate limiting.

mod common;

use axum::http::{header, StatusCode};
use common::{
    assert_error, build_test_app, build_test_app_with, get, get_auth, post_json, test_config,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_token_is_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app, "/api/v1/characters").await;
    let json = assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
    assert_eq!(json["error"], "Missing Authorization header");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_garbage_token_is_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get_auth(&app, "/api/v1/me", "not-a-jwt").await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_signed_with_other_secret_is_401(pool: PgPool) {
    let other = realms_api::auth::jwt::JwtConfig::with_secret("some-other-secret");
    let token = realms_api::auth::jwt::generate_access_token(1, "admin", &other).unwrap();

    let app = build_test_app(pool);
    let response = get_auth(&app, "/api/v1/admin/users", &token).await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_route_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(&app, "/api/v1/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rate_limit_returns_429_with_retry_after(pool: PgPool) {
    let mut config = test_config();
    config.rate_limit_max_requests = 2;
    let app = build_test_app_with(pool, config);

    let attempt = json!({ "login": "nobody", "password": "whatever1" });
    for _ in 0..2 {
        let response = post_json(&app, "/api/v1/auth/login", attempt.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_json(&app, "/api/v1/auth/login", attempt).await;
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .expect("Retry-After header");
    assert!((1..=60).contains(&retry_after));
    assert_error(response, StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rate_limit_is_per_forwarded_address(pool: PgPool) {
    use axum::body::Body;
    use axum::http::Request;

    let mut config = test_config();
    config.rate_limit_max_requests = 1;
    let app = build_test_app_with(pool, config);

    let login_from = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(
                json!({ "login": "nobody", "password": "whatever1" }).to_string(),
            ))
            .unwrap()
    };

    let first = common::send(&app, login_from("10.0.0.1")).await;
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);
    let other = common::send(&app, login_from("10.0.0.2")).await;
    assert_eq!(other.status(), StatusCode::UNAUTHORIZED);
    let again = common::send(&app, login_from("10.0.0.1")).await;
    assert_eq!(again.status(), StatusCode::TOO_MANY_REQUESTS);
}
