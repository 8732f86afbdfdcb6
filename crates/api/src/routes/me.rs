use axum::routing::{get, put};
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::get_me))
        .route("/username", put(me::change_username))
}
