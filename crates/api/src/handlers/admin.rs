//! Handlers for `/admin`: user roles, codex maintenance, the public
//! library and the lean character migration.
//!
//! Every handler requires the `admin` role via [`RequireAdmin`].

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realms_core::codex::{parse_codex_csv, shape, CodexKind, CodexView};
use realms_core::error::CoreError;
use realms_core::library::LibraryKind;
use realms_core::types::DbId;
use realms_db::lean_migration::{run_lean_migration, LeanMigrationSummary, DEFAULT_BATCH_SIZE};
use realms_db::models::codex::UpsertCodexEntry;
use realms_db::models::library::LibraryEntry;
use realms_db::models::user::UserResponse;
use realms_db::repositories::{CodexRepo, LibraryRepo, RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use super::library::{validate_create, validate_update, CreateEntryRequest, UpdateEntryRequest};
use super::public_library::find_public;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertCodexRequest {
    pub name: String,
    #[serde(default)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CodexImportResult {
    pub kind: CodexKind,
    pub imported: u64,
}

#[derive(Debug, Deserialize)]
pub struct LeanMigrationRequest {
    #[serde(default)]
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Revokes the user's sessions so the new role is picked up on next login.
/// Admins cannot change their own role.
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if admin.user_id == id {
        return Err(CoreError::Validation("You cannot change your own role".into()).into());
    }
    let role = RoleRepo::find_by_name(&state.pool, input.role.trim())
        .await?
        .ok_or_else(|| CoreError::Validation(format!("Unknown role '{}'", input.role)))?;

    UserRepo::update_role(&state.pool, id, role.id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(user_id = id, role = %role.name, admin_id = admin.user_id, "User role changed");

    let user = UserRepo::find_response_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(DataResponse { data: user }))
}

// ---------------------------------------------------------------------------
// Codex
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/codex/{kind}/{code}
pub async fn upsert_codex_entry(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, code)): Path<(String, String)>,
    Json(input): Json<UpsertCodexRequest>,
) -> AppResult<Json<DataResponse<CodexView>>> {
    let kind = CodexKind::from_path(&kind)?;
    let code = code.trim().to_string();
    let name = input.name.trim().to_string();
    if code.is_empty() || name.is_empty() {
        return Err(CoreError::Validation("Codex entries need a code and a name".into()).into());
    }

    let row = CodexRepo::upsert(
        &state.pool,
        kind,
        &UpsertCodexEntry {
            code,
            name,
            data: serde_json::Value::Object(input.data),
        },
    )
    .await?;
    tracing::info!(kind = kind.as_str(), code = %row.code, "Codex entry upserted");
    Ok(Json(DataResponse {
        data: shape(kind, &row.code, &row.name, &row.data),
    }))
}

/// DELETE /api/v1/admin/codex/{kind}/{code}
pub async fn delete_codex_entry(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, code)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let kind = CodexKind::from_path(&kind)?;
    if !CodexRepo::delete(&state.pool, kind, &code).await? {
        return Err(AppError::NotFound(format!(
            "No {} entry with code '{code}'",
            kind.as_str()
        )));
    }
    tracing::info!(kind = kind.as_str(), code = %code, "Codex entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/codex/{kind}/import
///
/// Body is the raw CSV export. Rows are upserted by code in one
/// transaction; any malformed row rejects the whole file.
pub async fn import_codex_csv(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Bytes,
) -> AppResult<Json<DataResponse<CodexImportResult>>> {
    let kind = CodexKind::from_path(&kind)?;
    let records = parse_codex_csv(kind, &body)?;
    let entries: Vec<UpsertCodexEntry> = records.into_iter().map(Into::into).collect();
    let imported = CodexRepo::bulk_upsert(&state.pool, kind, &entries).await?;
    tracing::info!(kind = kind.as_str(), imported, "Codex CSV imported");
    Ok(Json(DataResponse {
        data: CodexImportResult { kind, imported },
    }))
}

// ---------------------------------------------------------------------------
// Public library
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/public-library/{kind}
pub async fn create_public_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(input): Json<CreateEntryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LibraryEntry>>)> {
    let kind = LibraryKind::from_path(&kind)?;
    let dto = validate_create(kind, None, input)?;
    let entry = LibraryRepo::create(&state.pool, &dto).await?;
    tracing::info!(
        id = entry.id,
        kind = kind.as_str(),
        admin_id = admin.user_id,
        "Public entry created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// PUT /api/v1/admin/public-library/{kind}/{id}
pub async fn update_public_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
    Json(input): Json<UpdateEntryRequest>,
) -> AppResult<Json<DataResponse<LibraryEntry>>> {
    let kind = LibraryKind::from_path(&kind)?;
    find_public(&state, kind, id).await?;
    let patch = validate_update(input)?;
    let entry = LibraryRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "PublicLibraryEntry", id })?;
    tracing::info!(id, admin_id = admin.user_id, "Public entry updated");
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/admin/public-library/{kind}/{id}
///
/// Copies in user libraries survive; their `source_id` is cleared.
pub async fn delete_public_entry(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, DbId)>,
) -> AppResult<StatusCode> {
    let kind = LibraryKind::from_path(&kind)?;
    find_public(&state, kind, id).await?;
    LibraryRepo::delete(&state.pool, id).await?;
    tracing::info!(id, admin_id = admin.user_id, "Public entry deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Migrations
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/migrations/lean-characters
///
/// Body `{ "dry_run": true }` reports what would change without writing.
/// An empty body is a real run.
pub async fn migrate_lean_characters(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    input: Option<Json<LeanMigrationRequest>>,
) -> AppResult<Json<DataResponse<LeanMigrationSummary>>> {
    let dry_run = input.is_some_and(|Json(body)| body.dry_run);
    tracing::info!(admin_id = admin.user_id, dry_run, "Lean migration requested");
    let summary = run_lean_migration(&state.pool, dry_run, DEFAULT_BATCH_SIZE).await?;
    Ok(Json(DataResponse { data: summary }))
}
