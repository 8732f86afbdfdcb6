//! Handlers for the caller's own content library (`/library/{kind}`).
//!
//! Entries of every kind share one table; the kind comes from the path and
//! must match the stored row.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realms_core::error::CoreError;
use realms_core::library::{self, LibraryKind};
use realms_core::types::DbId;
use realms_db::models::library::{CreateLibraryEntry, LibraryEntry, UpdateLibraryEntry};
use realms_db::repositories::LibraryRepo;
use serde::Deserialize;

use super::costing::{cost_entry, EntryCost};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object")]
    pub payload: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub payload: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Shared with the public library and admin handlers
// ---------------------------------------------------------------------------

pub(crate) fn validate_create(
    kind: LibraryKind,
    owner_id: Option<DbId>,
    input: CreateEntryRequest,
) -> Result<CreateLibraryEntry, CoreError> {
    let name = library::validate_name(&input.name)?;
    library::validate_description(&input.description)?;
    library::validate_payload(&input.payload)?;
    Ok(CreateLibraryEntry {
        kind: kind.as_str().to_string(),
        owner_id,
        name,
        description: input.description,
        payload: input.payload,
    })
}

pub(crate) fn validate_update(input: UpdateEntryRequest) -> Result<UpdateLibraryEntry, CoreError> {
    if let Some(description) = &input.description {
        library::validate_description(description)?;
    }
    if let Some(payload) = &input.payload {
        library::validate_payload(payload)?;
    }
    Ok(UpdateLibraryEntry {
        name: input.name.as_deref().map(library::validate_name).transpose()?,
        description: input.description,
        payload: input.payload,
    })
}

/// Load an entry of `kind`. A row of another kind is reported as missing.
pub(crate) async fn find_entry(
    state: &AppState,
    kind: LibraryKind,
    id: DbId,
) -> AppResult<LibraryEntry> {
    LibraryRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|e| e.kind == kind.as_str())
        .ok_or_else(|| CoreError::NotFound { entity: "LibraryEntry", id }.into())
}

async fn find_owned(
    state: &AppState,
    auth: &AuthUser,
    kind: LibraryKind,
    id: DbId,
) -> AppResult<LibraryEntry> {
    let entry = find_entry(state, kind, id).await?;
    if entry.owner_id != Some(auth.user_id) {
        return Err(CoreError::Forbidden("This entry is not in your library".into()).into());
    }
    Ok(entry)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/library/{kind}
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<DataResponse<Vec<LibraryEntry>>>> {
    let kind = LibraryKind::from_path(&kind)?;
    let items = LibraryRepo::list(&state.pool, kind.as_str(), Some(auth.user_id)).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/library/{kind}
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(input): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LibraryEntry>>)> {
    let kind = LibraryKind::from_path(&kind)?;
    let dto = validate_create(kind, Some(auth.user_id), input)?;
    let entry = LibraryRepo::create(&state.pool, &dto).await?;
    tracing::info!(
        id = entry.id,
        kind = kind.as_str(),
        owner_id = auth.user_id,
        "Library entry created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/library/{kind}/{id}
///
/// Public entries are readable too.
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<LibraryEntry>>> {
    let kind = LibraryKind::from_path(&kind)?;
    let entry = find_entry(&state, kind, id).await?;
    if entry.owner_id.is_some_and(|owner| owner != auth.user_id) {
        return Err(CoreError::Forbidden("This entry is not in your library".into()).into());
    }
    Ok(Json(DataResponse { data: entry }))
}

/// PUT /api/v1/library/{kind}/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateEntryRequest>,
) -> AppResult<Json<DataResponse<LibraryEntry>>> {
    let kind = LibraryKind::from_path(&kind)?;
    find_owned(&state, &auth, kind, id).await?;
    let patch = validate_update(input)?;
    let entry = LibraryRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "LibraryEntry", id })?;
    tracing::info!(id, "Library entry updated");
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/library/{kind}/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let kind = LibraryKind::from_path(&kind)?;
    find_owned(&state, &auth, kind, id).await?;
    LibraryRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Library entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/library/{kind}/{id}/cost
///
/// Powers and techniques report energy and training points, items their
/// item points, currency and rarity, creatures their budgets.
pub async fn cost(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<Json<DataResponse<EntryCost>>> {
    let kind = LibraryKind::from_path(&kind)?;
    let entry = find_entry(&state, kind, id).await?;
    if entry.owner_id.is_some_and(|owner| owner != auth.user_id) {
        return Err(CoreError::Forbidden("This entry is not in your library".into()).into());
    }
    let cost = cost_entry(&state.pool, &entry).await?;
    Ok(Json(DataResponse { data: cost }))
}
