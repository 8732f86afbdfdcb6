use axum::routing::get;
use axum::Router;

use crate::handlers::library;
use crate::state::AppState;

/// Routes mounted at `/library`. `{kind}` is `powers`, `techniques`,
/// `items` or `creatures` (singular also accepted).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}", get(library::list).post(library::create))
        .route(
            "/{kind}/{id}",
            get(library::get_by_id)
                .put(library::update)
                .delete(library::delete),
        )
        .route("/{kind}/{id}/cost", get(library::cost))
}
