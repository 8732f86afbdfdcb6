use axum::routing::{get, post};
use axum::Router;

use crate::handlers::encounters;
use crate::state::AppState;

/// Routes mounted at `/encounters`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(encounters::list).post(encounters::create))
        .route(
            "/{id}",
            get(encounters::get_by_id)
                .put(encounters::update)
                .delete(encounters::delete),
        )
        .route("/{id}/actions", post(encounters::apply_action))
}
