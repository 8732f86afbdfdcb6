use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public_library;
use crate::state::AppState;

/// Routes mounted at `/public-library`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}", get(public_library::list))
        .route("/{kind}/{id}", get(public_library::get_by_id))
        .route("/{kind}/{id}/copy", post(public_library::copy))
}
