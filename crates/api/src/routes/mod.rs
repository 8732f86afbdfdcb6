pub mod admin;
pub mod auth;
pub mod campaigns;
pub mod characters;
pub mod codex;
pub mod encounters;
pub mod health;
pub mod library;
pub mod me;
pub mod public_library;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register | /auth/login | /auth/refresh | /auth/logout
///
/// /me                                         profile (GET)
/// /me/username                                change username (PUT)
///
/// /characters                                 list, create
/// /characters/{id}                            get, update, delete
/// /characters/{id}/sheet                      derived sheet (GET)
///
/// /codex                                      kinds with counts (GET)
/// /codex/{kind}                               shaped entries (GET, ?q=)
/// /codex/{kind}/{code}                        one entry (GET)
///
/// /library/{kind}                             list, create (own library)
/// /library/{kind}/{id}                        get, update, delete
/// /library/{kind}/{id}/cost                   cost preview (GET)
///
/// /public-library/{kind}                      list (GET)
/// /public-library/{kind}/{id}                 get (GET)
/// /public-library/{kind}/{id}/copy            copy to own library (POST)
///
/// /campaigns                                  list, create
/// /campaigns/join                             join by invite code (POST)
/// /campaigns/{id}                             get, update, delete
/// /campaigns/{id}/invite-code                 regenerate (POST)
/// /campaigns/{id}/characters/{character_id}   remove character (DELETE)
///
/// /encounters                                 list, create
/// /encounters/{id}                            get, update, delete
/// /encounters/{id}/actions                    apply tracker action (POST)
///
/// /admin/users                                list (GET)
/// /admin/users/{id}/role                      set role (PUT)
/// /admin/codex/{kind}/{code}                  upsert, delete
/// /admin/codex/{kind}/import                  CSV import (POST)
/// /admin/public-library/{kind}                create (POST)
/// /admin/public-library/{kind}/{id}           update, delete
/// /admin/migrations/lean-characters           lean migration (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", me::router())
        .nest("/characters", characters::router())
        .nest("/codex", codex::router())
        .nest("/library", library::router())
        .nest("/public-library", public_library::router())
        .nest("/campaigns", campaigns::router())
        .nest("/encounters", encounters::router())
        .nest("/admin", admin::router())
}
