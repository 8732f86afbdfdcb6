//! Personal library, public library browsing and copying, and costing.

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, body_json, build_test_app, delete_auth, get, get_auth, post_auth,
    post_json_auth, put_json_auth, register, register_admin,
};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create_entry(app: &axum::Router, token: &str, uri: &str, body: Value) -> Value {
    let response = post_json_auth(app, uri, token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Personal library
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_library_crud(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, user_id) = register(&app, "Aria").await;

    let entry = create_entry(
        &app,
        &token,
        "/api/v1/library/powers",
        json!({ "name": " Fire Bolt ", "description": "Hurls fire" }),
    )
    .await;
    assert_eq!(entry["kind"], "power");
    assert_eq!(entry["name"], "Fire Bolt");
    assert_eq!(entry["owner_id"], user_id);
    assert_eq!(entry["payload"], json!({}));

    // Singular and plural segments address the same kind.
    let uri = format!("/api/v1/library/power/{}", entry["id"]);
    let response = put_json_auth(&app, &uri, &token, json!({ "name": "Flame Bolt" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Flame Bolt");

    let list = body_json(get_auth(&app, "/api/v1/library/powers", &token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    let techniques = body_json(get_auth(&app, "/api/v1/library/techniques", &token).await).await;
    assert!(techniques["data"].as_array().unwrap().is_empty());

    assert_eq!(delete_auth(&app, &uri, &token).await.status(), StatusCode::NO_CONTENT);
    let response = get_auth(&app, &uri, &token).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_library_rejects_bad_input(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;

    let unknown_kind =
        post_json_auth(&app, "/api/v1/library/spells", &token, json!({ "name": "Zap" })).await;
    assert_error(unknown_kind, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let blank = post_json_auth(&app, "/api/v1/library/items", &token, json!({ "name": " " })).await;
    assert_error(blank, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;

    let array_payload = post_json_auth(
        &app,
        "/api/v1/library/items",
        &token,
        json!({ "name": "Rope", "payload": [1, 2] }),
    )
    .await;
    assert_error(array_payload, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_entries_are_scoped_by_kind_and_owner(pool: PgPool) {
    let app = build_test_app(pool);
    let (owner, _) = register(&app, "Aria").await;
    let (other, _) = register(&app, "Brann").await;
    let entry =
        create_entry(&app, &owner, "/api/v1/library/items", json!({ "name": "Rope" })).await;

    // Addressed under the wrong kind the entry does not exist.
    let wrong_kind = format!("/api/v1/library/powers/{}", entry["id"]);
    let response = get_auth(&app, &wrong_kind, &owner).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;

    let uri = format!("/api/v1/library/items/{}", entry["id"]);
    let response = get_auth(&app, &uri, &other).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
    let response = delete_auth(&app, &uri, &other).await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

// ---------------------------------------------------------------------------
// Costing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_power_cost_uses_codex_parts(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;
    let (token, _) = register(&app, "Aria").await;

    put_json_auth(
        &app,
        "/api/v1/admin/codex/parts/blast",
        &admin,
        json!({ "name": "Blast", "data": { "base_en": 2, "base_tp": 1 } }),
    )
    .await;
    put_json_auth(
        &app,
        "/api/v1/admin/codex/parts/area",
        &admin,
        json!({ "name": "Area", "data": { "base_en": 1.5, "percentage": true } }),
    )
    .await;

    let entry = create_entry(
        &app,
        &token,
        "/api/v1/library/powers",
        json!({
            "name": "Fireball",
            "payload": {
                "actionType": "basic",
                "parts": [{ "partId": "blast" }, { "partId": "area" }],
                "damage": [{ "amount": 2, "size": 6 }]
            }
        }),
    )
    .await;

    let uri = format!("/api/v1/library/powers/{}/cost", entry["id"]);
    let response = get_auth(&app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cost = body_json(response).await["data"].clone();
    // (2 + 2 * (6 / 2 - 1)) * 1.5 = 9
    assert_eq!(cost, json!({ "kind": "power", "energy": 9, "training_points": 1 }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cost_of_unknown_part_is_400(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;
    let entry = create_entry(
        &app,
        &token,
        "/api/v1/library/techniques",
        json!({ "name": "Cleave", "payload": { "parts": [{ "partId": "nope" }] } }),
    )
    .await;

    let uri = format!("/api/v1/library/techniques/{}/cost", entry["id"]);
    let json = assert_error(
        get_auth(&app, &uri, &token).await,
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
    )
    .await;
    assert!(json["error"].as_str().unwrap().contains("nope"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_item_cost_uses_codex_properties(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;
    let (token, _) = register(&app, "Aria").await;

    put_json_auth(
        &app,
        "/api/v1/admin/codex/properties/keen",
        &admin,
        json!({
            "name": "Keen",
            "data": { "base_ip": 1, "base_tp": 1, "base_c": 20, "op_1_ip": 1, "op_1_c": 10 }
        }),
    )
    .await;

    let entry = create_entry(
        &app,
        &token,
        "/api/v1/library/items",
        json!({
            "name": "Keen Blade",
            "payload": { "properties": [{ "propertyId": "keen", "op1": 2 }] }
        }),
    )
    .await;

    let uri = format!("/api/v1/library/items/{}/cost", entry["id"]);
    let cost = body_json(get_auth(&app, &uri, &token).await).await["data"].clone();
    assert_eq!(cost["kind"], "item");
    assert_eq!(cost["item_points"], 3);
    assert_eq!(cost["training_points"], 1);
    assert_eq!(cost["currency"], 40);
    assert_eq!(cost["rarity"], "uncommon");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_creature_cost_reports_budgets(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;
    let entry = create_entry(
        &app,
        &token,
        "/api/v1/library/creatures",
        json!({ "name": "Wolf", "payload": { "level": 3, "healthPoints": 10, "energyPoints": 4 } }),
    )
    .await;

    let uri = format!("/api/v1/library/creatures/{}/cost", entry["id"]);
    let cost = body_json(get_auth(&app, &uri, &token).await).await["data"].clone();
    assert_eq!(cost["kind"], "creature");
    assert_eq!(cost["level"], 3);
    assert_eq!(cost["health_energy_points"]["total"], 38);
    assert_eq!(cost["health_energy_points"]["spent"], 14);
}

// ---------------------------------------------------------------------------
// Public library
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_library_browse_and_copy(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;
    let (token, user_id) = register(&app, "Aria").await;

    let public = create_entry(
        &app,
        &admin,
        "/api/v1/admin/public-library/powers",
        json!({ "name": "Shield", "payload": { "parts": [] } }),
    )
    .await;
    assert!(public["owner_id"].is_null());

    // Browsing needs a token.
    assert_eq!(get(&app, "/api/v1/public-library/powers").await.status(), StatusCode::UNAUTHORIZED);
    let list = body_json(get_auth(&app, "/api/v1/public-library/powers", &token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    let copy_uri = format!("/api/v1/public-library/powers/{}/copy", public["id"]);
    let response = post_auth(&app, &copy_uri, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let copy = body_json(response).await["data"].clone();
    assert_eq!(copy["owner_id"], user_id);
    assert_eq!(copy["source_id"], public["id"]);
    assert_eq!(copy["name"], "Shield");

    // The copy is independent of later public edits.
    let admin_uri = format!("/api/v1/admin/public-library/powers/{}", public["id"]);
    put_json_auth(&app, &admin_uri, &admin, json!({ "name": "Greater Shield" })).await;
    let own = format!("/api/v1/library/powers/{}", copy["id"]);
    let own = body_json(get_auth(&app, &own, &token).await).await;
    assert_eq!(own["data"]["name"], "Shield");

    // Deleting the public entry keeps the copy and clears its source.
    assert_eq!(delete_auth(&app, &admin_uri, &admin).await.status(), StatusCode::NO_CONTENT);
    let own = format!("/api/v1/library/powers/{}", copy["id"]);
    let own = body_json(get_auth(&app, &own, &token).await).await;
    assert!(own["data"]["source_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_personal_entries_are_not_public(pool: PgPool) {
    let app = build_test_app(pool);
    let (owner, _) = register(&app, "Aria").await;
    let (other, _) = register(&app, "Brann").await;
    let entry =
        create_entry(&app, &owner, "/api/v1/library/powers", json!({ "name": "Secret" })).await;

    let uri = format!("/api/v1/public-library/powers/{}", entry["id"]);
    let response = get_auth(&app, &uri, &other).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
    let copy = format!("{uri}/copy");
    let response = post_auth(&app, &copy, &other).await;
    assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_names_are_unique_per_kind(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (admin, _) = register_admin(&app, &pool, "Warden").await;

    let shield = json!({ "name": "Shield" });
    let public_powers = "/api/v1/admin/public-library/powers";
    create_entry(&app, &admin, public_powers, shield.clone()).await;
    let duplicate = post_json_auth(
        &app,
        "/api/v1/admin/public-library/powers",
        &admin,
        json!({ "name": "SHIELD" }),
    )
    .await;
    assert_error(duplicate, StatusCode::CONFLICT, "CONFLICT").await;

    // Same name under another kind is fine.
    let public_techniques = "/api/v1/admin/public-library/techniques";
    create_entry(&app, &admin, public_techniques, shield).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_public_writes_require_admin(pool: PgPool) {
    let app = build_test_app(pool);
    let (token, _) = register(&app, "Aria").await;
    let response = post_json_auth(
        &app,
        "/api/v1/admin/public-library/powers",
        &token,
        json!({ "name": "Shield" }),
    )
    .await;
    assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}
