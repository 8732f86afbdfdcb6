//! Handlers for `/characters`.
//!
//! Every write goes through [`prepare_for_save`], so the stored document is
//! always lean no matter what shape the client sends. The sheet endpoint
//! recomputes derived values on read.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realms_core::character::{
    derive_sheet, prepare_for_save, CharacterData, CharacterSheet, LoadoutCost, LoadoutSource,
    SheetIssue,
};
use realms_core::error::CoreError;
use realms_core::library::LibraryKind;
use realms_core::types::{DbId, Visibility};
use realms_db::models::character::{
    Character, CharacterSummary, CreateCharacter, UpdateCharacter,
};
use realms_db::models::library::LibraryEntry;
use realms_db::repositories::{CharacterRepo, LibraryRepo};
use serde::Deserialize;

use super::costing::{load_part_defs, power_cost};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 80;

#[derive(Debug, Deserialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    /// Character document in any accepted shape; defaults to an empty sheet.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub visibility: Option<Visibility>,
    pub data: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Character name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Character name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

/// Normalize an incoming document, returning the lean JSON and its level.
fn lean_document(raw: serde_json::Value) -> AppResult<(serde_json::Value, i32)> {
    let data = prepare_for_save(raw)?;
    let level = data.level;
    let value = serde_json::to_value(&data)
        .map_err(|e| AppError::InternalError(format!("Character serialization error: {e}")))?;
    Ok((value, level))
}

async fn find_character(state: &AppState, id: DbId) -> AppResult<Character> {
    CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Character", id }.into())
}

/// Owners and admins may read any character; everyone else only public ones.
async fn find_readable(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Character> {
    let character = find_character(state, id).await?;
    let public = Visibility::from_db(&character.visibility) == Visibility::Public;
    if character.owner_id != auth.user_id && !auth.is_admin() && !public {
        return Err(CoreError::Forbidden("This character is private".into()).into());
    }
    Ok(character)
}

async fn find_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Character> {
    let character = find_character(state, id).await?;
    if character.owner_id != auth.user_id && !auth.is_admin() {
        return Err(CoreError::Forbidden("You do not own this character".into()).into());
    }
    Ok(character)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/characters
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CharacterSummary>>>> {
    let items = CharacterRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/characters
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCharacterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Character>>)> {
    let name = validate_name(&input.name)?;
    let raw = input
        .data
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));
    let (data, level) = lean_document(raw)?;

    let character = CharacterRepo::create(
        &state.pool,
        &CreateCharacter {
            owner_id: auth.user_id,
            name,
            level,
            visibility: input.visibility.as_str().to_string(),
            data,
        },
    )
    .await?;
    tracing::info!(id = character.id, owner_id = auth.user_id, "Character created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: character })))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Character>>> {
    let character = find_readable(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: character }))
}

/// PUT /api/v1/characters/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCharacterRequest>,
) -> AppResult<Json<DataResponse<Character>>> {
    find_owned(&state, &auth, id).await?;

    let mut patch = UpdateCharacter {
        name: input.name.as_deref().map(validate_name).transpose()?,
        visibility: input.visibility.map(|v| v.as_str().to_string()),
        ..Default::default()
    };
    if let Some(raw) = input.data {
        let (data, level) = lean_document(raw)?;
        patch.data = Some(data);
        patch.level = Some(level);
    }

    let character = CharacterRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Character", id })?;
    tracing::info!(id, "Character updated");
    Ok(Json(DataResponse { data: character }))
}

/// DELETE /api/v1/characters/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, &auth, id).await?;
    if !CharacterRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound { entity: "Character", id }.into());
    }
    tracing::info!(id, "Character deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/characters/{id}/sheet
///
/// Powers and techniques are resolved against the character owner's
/// library (and the public library) and costed with the current codex
/// parts. References that cannot be resolved are reported as sheet issues.
pub async fn sheet(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CharacterSheet>>> {
    let character = find_readable(&state, &auth, id).await?;
    let data = prepare_for_save(character.data)?;

    let ids: Vec<DbId> = data
        .library_refs()
        .filter_map(|r| r.parse::<DbId>().ok())
        .collect();
    let entries: HashMap<String, LibraryEntry> =
        LibraryRepo::find_usable_by_ids(&state.pool, character.owner_id, &ids)
            .await?
            .into_iter()
            .map(|e| (e.id.to_string(), e))
            .collect();
    let parts = if entries.is_empty() {
        HashMap::new()
    } else {
        load_part_defs(&state.pool).await?
    };

    let (loadout, mut issues) = resolve_loadout(&data, &entries, &parts);
    let mut sheet = derive_sheet(&data, &loadout);
    sheet.issues.append(&mut issues);
    Ok(Json(DataResponse { data: sheet }))
}

fn resolve_loadout(
    data: &CharacterData,
    entries: &HashMap<String, LibraryEntry>,
    parts: &HashMap<String, realms_core::costs::PartDef>,
) -> (Vec<LoadoutCost>, Vec<SheetIssue>) {
    let refs = data
        .powers
        .iter()
        .map(|p| (LoadoutSource::Power, LibraryKind::Power, p.id.as_str()))
        .chain(
            data.techniques
                .iter()
                .map(|t| (LoadoutSource::Technique, LibraryKind::Technique, t.id.as_str())),
        );

    let mut loadout = Vec::new();
    let mut issues = Vec::new();
    for (source, kind, id) in refs {
        let Some(entry) = entries.get(id).filter(|e| e.kind == kind.as_str()) else {
            issues.push(SheetIssue::new(
                "missing_library_entry",
                format!("No {} with id '{id}' in the library", kind.as_str()),
            ));
            continue;
        };
        match power_cost(entry, parts) {
            Ok(cost) => loadout.push(LoadoutCost {
                source,
                id: id.to_string(),
                name: entry.name.clone(),
                energy: cost.energy,
                training_points: cost.training_points,
            }),
            Err(err) => issues.push(SheetIssue::new(
                "invalid_library_entry",
                format!("'{}' cannot be costed: {err}", entry.name),
            )),
        }
    }
    (loadout, issues)
}
