//! Handlers for the shared public library (`/public-library/{kind}`).
//!
//! Any signed-in user may browse and copy. Admin writes are in
//! [`super::admin`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realms_core::error::CoreError;
use realms_core::library::LibraryKind;
use realms_core::types::DbId;
use realms_db::models::library::LibraryEntry;
use realms_db::repositories::LibraryRepo;

use super::library::find_entry;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) async fn find_public(
    state: &AppState,
    kind: LibraryKind,
    id: DbId,
) -> AppResult<LibraryEntry> {
    let entry = find_entry(state, kind, id).await?;
    if entry.owner_id.is_some() {
        return Err(CoreError::NotFound { entity: "PublicLibraryEntry", id }.into());
    }
    Ok(entry)
}

/// GET /api/v1/public-library/{kind}
pub async fn list(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<DataResponse<Vec<LibraryEntry>>>> {
    let kind = LibraryKind::from_path(&kind)?;
    let items = LibraryRepo::list(&state.pool, kind.as_str(), None).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/public-library/{kind}/{id}
pub async fn get_by_id(
    RequireAuth(_): RequireAuth,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<LibraryEntry>>> {
    let kind = LibraryKind::from_path(&kind)?;
    let entry = find_public(&state, kind, id).await?;
    Ok(Json(DataResponse { data: entry }))
}

/// POST /api/v1/public-library/{kind}/{id}/copy
///
/// The copy keeps a `source_id` back-reference and is independent from then
/// on.
pub async fn copy(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<(StatusCode, Json<DataResponse<LibraryEntry>>)> {
    let kind = LibraryKind::from_path(&kind)?;
    find_public(&state, kind, id).await?;
    let copy = LibraryRepo::copy_public_to_owner(&state.pool, id, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound { entity: "PublicLibraryEntry", id })?;
    tracing::info!(source_id = id, id = copy.id, user_id = auth.user_id, "Public entry copied");
    Ok((StatusCode::CREATED, Json(DataResponse { data: copy })))
}
