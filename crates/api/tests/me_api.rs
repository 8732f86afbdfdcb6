//! Profile and username changes.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, get_auth, login, post_json, put_json_auth, register,
    register_admin, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

async fn rename(app: &axum::Router, token: &str, username: &str) -> axum::response::Response {
    put_json_auth(app, "/api/v1/me/username", token, json!({ "username": username })).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_me(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, id) = register(&app, "Aria").await;

    let response = get_auth(&app, "/api/v1/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["username"], "Aria");
    assert_eq!(json["data"]["role"], "user");
    assert!(json["data"]["username_changed_at"].is_null());
    assert!(json["data"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_username_frees_the_old_name(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;

    let response = rename(&app, &token, "Ariadne").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "Ariadne");
    assert!(json["data"]["username_changed_at"].is_string());

    // Login follows the new name, and the old one is free again.
    assert_eq!(login(&app, "ariadne", TEST_PASSWORD).await.status(), StatusCode::OK);
    assert_eq!(login(&app, "Aria", TEST_PASSWORD).await.status(), StatusCode::UNAUTHORIZED);
    let response = post_json(
        &app,
        "/api/v1/auth/register",
        json!({ "username": "aria", "email": "second@example.com", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_username_to_taken_name_is_409(pool: PgPool) {
    let app = build_test_app(pool);
    register(&app, "Brann").await;
    let (token, _) = register(&app, "Aria").await;

    let response = rename(&app, &token, "BRANN").await;
    assert_error(response, StatusCode::CONFLICT, "CONFLICT").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_username_rejects_same_or_invalid_name(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;

    for name in ["Aria", "x", "has space", "support"] {
        let response = rename(&app, &token, name).await;
        assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recasing_own_username_is_allowed(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "aria").await;

    let response = rename(&app, &token, "Aria").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["username"], "Aria");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_username_change_cooldown(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;

    let first = rename(&app, &token, "Ariadne").await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = rename(&app, &token, "Arianna").await;
    let json = assert_error(second, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
    assert!(json["error"].as_str().unwrap().contains("once every 7 days"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admins_skip_the_cooldown(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (token, _) = register_admin(&app, &pool, "Warden").await;

    for name in ["Warden_two", "Warden_three"] {
        let response = rename(&app, &token, name).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
