//! User administration and the lean character migration endpoint.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, get_auth, login, post_auth, post_json,
    post_json_auth, put_json_auth, register, register_admin, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_users_is_admin_only(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;
    let (token, _) = register(&app, "Aria").await;

    let response = get_auth(&app, "/api/v1/admin/users", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get_auth(&app, "/api/v1/admin/users", &token).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_role_revokes_sessions(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;
    register(&app, "Aria").await;
    let session = body_json(login(&app, "Aria", TEST_PASSWORD).await).await;
    let user_id = session["user"]["id"].as_i64().unwrap();

    let uri = format!("/api/v1/admin/users/{user_id}/role");
    let response = put_json_auth(&app, &uri, &admin, json!({ "role": "admin" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["role"], "admin");

    let response = post_json(
        &app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": session["refresh_token"] }),
    )
    .await;
    assert_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let relogin = body_json(login(&app, "Aria", TEST_PASSWORD).await).await;
    assert_eq!(relogin["user"]["role"], "admin");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_role_rejections(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, admin_id) = register_admin(&app, &pool, "Warden").await;
    let (_, user_id) = register(&app, "Aria").await;

    let own = format!("/api/v1/admin/users/{admin_id}/role");
    let response = put_json_auth(&app, &own, &admin, json!({ "role": "user" })).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let other = format!("/api/v1/admin/users/{user_id}/role");
    let response = put_json_auth(&app, &other, &admin, json!({ "role": "overlord" })).await;
    assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let response = put_json_auth(
        &app,
        "/api/v1/admin/users/999999/role",
        &admin,
        json!({ "role": "user" }),
    )
    .await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Lean migration
// ---------------------------------------------------------------------------

async fn insert_raw_character(pool: &PgPool, owner_id: i64, data: serde_json::Value) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO characters (owner_id, name, level, data) VALUES ($1, 'Legacy', 1, $2)
         RETURNING id",
    )
    .bind(owner_id)
    .bind(data)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn stored_data(pool: &PgPool, id: i64) -> (serde_json::Value, i32) {
    sqlx::query_as("SELECT data, level FROM characters WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lean_migration_dry_run_then_real_run(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;
    let (token, user_id) = register(&app, "Aria").await;

    let legacy = insert_raw_character(
        &pool,
        user_id,
        json!({
            "level": 5,
            "health": { "current": 12, "max": 30 },
            "maxEnergy": 9,
            "pow_prof": 1
        }),
    )
    .await;
    let broken = insert_raw_character(&pool, user_id, json!(["not", "an", "object"])).await;
    // Saved through the API, so already lean.
    post_json_auth(&app, "/api/v1/characters", &token, json!({ "name": "Modern" })).await;

    let uri = "/api/v1/admin/migrations/lean-characters";
    let response = post_json_auth(&app, uri, &admin, json!({ "dry_run": true })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await["data"].clone();
    assert_eq!(summary["dry_run"], true);
    assert_eq!(summary["scanned"], 3);
    assert_eq!(summary["migrated"], 1);
    assert_eq!(summary["unchanged"], 1);
    assert_eq!(summary["failures"][0]["character_id"], broken);

    // Dry run wrote nothing.
    let (data, _) = stored_data(&pool, legacy).await;
    assert!(data.get("health").is_some());

    let response = post_auth(&app, uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await["data"].clone();
    assert_eq!(summary["dry_run"], false);
    assert_eq!(summary["migrated"], 1);

    let (data, level) = stored_data(&pool, legacy).await;
    assert_eq!(level, 5);
    assert!(data.get("health").is_none());
    assert!(data.get("maxEnergy").is_none());
    assert!(data.get("pow_prof").is_none());
    assert_eq!(data["currentHealth"], 12);
    assert_eq!(data["powerProficiency"], 1);

    // A second run finds nothing left to do.
    let response = post_auth(&app, uri, &admin).await;
    let summary = body_json(response).await["data"].clone();
    assert_eq!(summary["migrated"], 0);
    assert_eq!(summary["unchanged"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lean_migration_requires_admin(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;
    let response = post_auth(&app, "/api/v1/admin/migrations/lean-characters", &token).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}
