//! Handlers for `/encounters`: the owner-only initiative tracker.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realms_core::encounter::{EncounterAction, EncounterState};
use realms_core::error::CoreError;
use realms_core::types::DbId;
use realms_db::models::encounter::{CreateEncounter, Encounter, UpdateEncounter};
use realms_db::repositories::{CampaignRepo, EncounterRepo};
use serde::{Deserialize, Deserializer};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 120;

#[derive(Debug, Deserialize)]
pub struct CreateEncounterRequest {
    pub name: String,
    pub campaign_id: Option<DbId>,
    #[serde(default)]
    pub state: EncounterState,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEncounterRequest {
    pub name: Option<String>,
    /// Absent leaves the link alone, `null` detaches the encounter.
    #[serde(default, deserialize_with = "nullable")]
    pub campaign_id: Option<Option<DbId>>,
    pub state: Option<EncounterState>,
}

/// Keeps an explicit `null` apart from a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Encounter name must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn state_to_json(state: &EncounterState) -> AppResult<serde_json::Value> {
    serde_json::to_value(state)
        .map_err(|e| AppError::InternalError(format!("Encounter serialization error: {e}")))
}

async fn find_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Encounter> {
    let encounter = EncounterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Encounter", id })?;
    if encounter.owner_id != auth.user_id {
        return Err(CoreError::Forbidden("You do not own this encounter".into()).into());
    }
    Ok(encounter)
}

/// Encounters may only be attached to campaigns the caller runs.
async fn check_campaign(state: &AppState, auth: &AuthUser, campaign_id: DbId) -> AppResult<()> {
    let campaign = CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        })?;
    if campaign.owner_id != auth.user_id {
        return Err(CoreError::Forbidden(
            "Encounters can only be attached to your own campaigns".into(),
        )
        .into());
    }
    Ok(())
}

/// GET /api/v1/encounters
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Encounter>>>> {
    let items = EncounterRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/encounters
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEncounterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Encounter>>)> {
    let name = validate_name(&input.name)?;
    input.state.validate()?;
    if let Some(campaign_id) = input.campaign_id {
        check_campaign(&state, &auth, campaign_id).await?;
    }
    let encounter = EncounterRepo::create(
        &state.pool,
        &CreateEncounter {
            owner_id: auth.user_id,
            campaign_id: input.campaign_id,
            name,
            state: state_to_json(&input.state)?,
        },
    )
    .await?;
    tracing::info!(id = encounter.id, owner_id = auth.user_id, "Encounter created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: encounter })))
}

/// GET /api/v1/encounters/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Encounter>>> {
    let encounter = find_owned(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: encounter }))
}

/// PUT /api/v1/encounters/{id}
///
/// Replaces the whole tracker state when `state` is given. The replacement
/// must be a consistent tracker state.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEncounterRequest>,
) -> AppResult<Json<DataResponse<Encounter>>> {
    find_owned(&state, &auth, id).await?;
    if let Some(tracker) = &input.state {
        tracker.validate()?;
    }
    if let Some(Some(campaign_id)) = input.campaign_id {
        check_campaign(&state, &auth, campaign_id).await?;
    }
    let patch = UpdateEncounter {
        name: input.name.as_deref().map(validate_name).transpose()?,
        campaign_id: input.campaign_id,
        state: input.state.as_ref().map(state_to_json).transpose()?,
    };
    let encounter = EncounterRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Encounter", id })?;
    Ok(Json(DataResponse { data: encounter }))
}

/// DELETE /api/v1/encounters/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, &auth, id).await?;
    EncounterRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Encounter deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/encounters/{id}/actions
///
/// Applies one tracker action. A rejected action leaves the stored state
/// untouched.
pub async fn apply_action(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(action): Json<EncounterAction>,
) -> AppResult<Json<DataResponse<Encounter>>> {
    let encounter = find_owned(&state, &auth, id).await?;
    let mut tracker: EncounterState = serde_json::from_value(encounter.state).map_err(|e| {
        AppError::InternalError(format!("Stored encounter {id} has invalid state: {e}"))
    })?;

    tracker.apply(action)?;

    let patch = UpdateEncounter {
        state: Some(state_to_json(&tracker)?),
        ..Default::default()
    };
    let encounter = EncounterRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Encounter", id })?;
    tracing::debug!(
        id,
        round = tracker.round,
        turn = tracker.turn_index,
        "Encounter action applied"
    );
    Ok(Json(DataResponse { data: encounter }))
}
