//! Routes mounted at `/admin`. Every handler checks the admin role itself.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::set_role))
        .route(
            "/codex/{kind}/{code}",
            put(admin::upsert_codex_entry).delete(admin::delete_codex_entry),
        )
        .route("/codex/{kind}/import", post(admin::import_codex_csv))
        .route("/public-library/{kind}", post(admin::create_public_entry))
        .route(
            "/public-library/{kind}/{id}",
            put(admin::update_public_entry).delete(admin::delete_public_entry),
        )
        .route(
            "/migrations/lean-characters",
            post(admin::migrate_lean_characters),
        )
}
