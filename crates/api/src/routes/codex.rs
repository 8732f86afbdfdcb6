use axum::routing::get;
use axum::Router;

use crate::handlers::codex;
use crate::state::AppState;

/// Routes mounted at `/codex`. Public, no token needed.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(codex::list_kinds))
        .route("/{kind}", get(codex::list))
        .route("/{kind}/{code}", get(codex::get_by_code))
}
