use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// GET, POST          /
/// POST               /join
/// GET, PUT, DELETE   /{id}
/// POST               /{id}/invite-code
/// DELETE             /{id}/characters/{character_id}
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaigns::list).post(campaigns::create))
        .route("/join", post(campaigns::join))
        .route(
            "/{id}",
            get(campaigns::get_by_id)
                .put(campaigns::update)
                .delete(campaigns::delete),
        )
        .route("/{id}/invite-code", post(campaigns::regenerate_invite_code))
        .route(
            "/{id}/characters/{character_id}",
            delete(campaigns::remove_character),
        )
}
