//! Handlers for `/campaigns`.
//!
//! The owner manages the campaign and its invite code. Players join with a
//! code and one of their own characters; anyone with a character enrolled
//! may view the campaign.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use realms_core::campaign::{can_remove_character, generate_invite_code, normalize_invite_code};
use realms_core::error::CoreError;
use realms_core::types::{DbId, Timestamp};
use realms_db::models::campaign::{
    Campaign, CampaignMember, CreateCampaign, JoinOutcome, UpdateCampaign,
};
use realms_db::repositories::{CampaignRepo, CharacterRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const MAX_NAME_LENGTH: usize = 120;
const MAX_DESCRIPTION_LENGTH: usize = 5_000;

/// Attempts at drawing an unused invite code before giving up.
const INVITE_CODE_ATTEMPTS: usize = 5;

const INVITE_CODE_CONSTRAINT: &str = "uq_campaigns_invite_code";

#[derive(Debug, Deserialize)]
pub struct CreateCampaignRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinCampaignRequest {
    pub invite_code: String,
    pub character_id: DbId,
}

/// Campaign with its roster. The invite code is only shown to the owner.
#[derive(Debug, Serialize)]
pub struct CampaignDetail {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: String,
    pub invite_code: Option<String>,
    pub members: Vec<CampaignMember>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CampaignDetail {
    fn new(campaign: Campaign, members: Vec<CampaignMember>, viewer: &AuthUser) -> Self {
        let show_code = campaign.owner_id == viewer.user_id || viewer.is_admin();
        Self {
            id: campaign.id,
            owner_id: campaign.owner_id,
            name: campaign.name,
            description: campaign.description,
            invite_code: show_code.then_some(campaign.invite_code),
            members,
            created_at: campaign.created_at,
            updated_at: campaign.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Campaign name must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

fn is_invite_code_collision(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.constraint() == Some(INVITE_CODE_CONSTRAINT))
}

async fn find_campaign(state: &AppState, id: DbId) -> AppResult<Campaign> {
    CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound { entity: "Campaign", id }.into())
}

async fn find_owned(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Campaign> {
    let campaign = find_campaign(state, id).await?;
    if campaign.owner_id != auth.user_id && !auth.is_admin() {
        return Err(CoreError::Forbidden("Only the campaign owner can do that".into()).into());
    }
    Ok(campaign)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/campaigns
///
/// Campaigns the caller owns or plays in.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Campaign>>>> {
    let mut items = CampaignRepo::list_for_user(&state.pool, auth.user_id).await?;
    for campaign in items.iter_mut().filter(|c| c.owner_id != auth.user_id) {
        campaign.invite_code.clear();
    }
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/campaigns
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCampaignRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Campaign>>)> {
    let name = validate_name(&input.name)?;
    validate_description(&input.description)?;

    let mut dto = CreateCampaign {
        owner_id: auth.user_id,
        name,
        description: input.description,
        invite_code: generate_invite_code(),
    };
    for _ in 0..INVITE_CODE_ATTEMPTS {
        match CampaignRepo::create(&state.pool, &dto).await {
            Ok(campaign) => {
                tracing::info!(id = campaign.id, owner_id = auth.user_id, "Campaign created");
                return Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })));
            }
            Err(err) if is_invite_code_collision(&err) => {
                dto.invite_code = generate_invite_code();
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::InternalError(
        "Could not allocate a unique invite code".into(),
    ))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CampaignDetail>>> {
    let campaign = find_campaign(&state, id).await?;
    if !auth.is_admin() && !CampaignRepo::is_participant(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::Forbidden("You are not part of this campaign".into()).into());
    }
    let members = CampaignRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: CampaignDetail::new(campaign, members, &auth),
    }))
}

/// PUT /api/v1/campaigns/{id}
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCampaignRequest>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    find_owned(&state, &auth, id).await?;
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    let patch = UpdateCampaign {
        name: input.name.as_deref().map(validate_name).transpose()?,
        description: input.description,
    };
    let campaign = CampaignRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(CoreError::NotFound { entity: "Campaign", id })?;
    tracing::info!(id, "Campaign updated");
    Ok(Json(DataResponse { data: campaign }))
}

/// DELETE /api/v1/campaigns/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned(&state, &auth, id).await?;
    CampaignRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/campaigns/join
pub async fn join(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<JoinCampaignRequest>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    let code = normalize_invite_code(&input.invite_code)?;
    match CampaignRepo::join(&state.pool, &code, input.character_id, auth.user_id).await? {
        JoinOutcome::Joined(mut campaign) => {
            tracing::info!(
                campaign_id = campaign.id,
                character_id = input.character_id,
                "Character joined campaign"
            );
            if campaign.owner_id != auth.user_id {
                campaign.invite_code.clear();
            }
            Ok(Json(DataResponse { data: campaign }))
        }
        JoinOutcome::UnknownCode => Err(AppError::NotFound(
            "No campaign with that invite code".into(),
        )),
        JoinOutcome::CharacterNotOwned => Err(CoreError::Forbidden(
            "You can only join with your own character".into(),
        )
        .into()),
    }
}

/// POST /api/v1/campaigns/{id}/invite-code
///
/// Replaces the invite code; the old one stops working immediately.
pub async fn regenerate_invite_code(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Campaign>>> {
    find_owned(&state, &auth, id).await?;
    for _ in 0..INVITE_CODE_ATTEMPTS {
        match CampaignRepo::set_invite_code(&state.pool, id, &generate_invite_code()).await {
            Ok(Some(campaign)) => {
                tracing::info!(id, "Campaign invite code regenerated");
                return Ok(Json(DataResponse { data: campaign }));
            }
            Ok(None) => return Err(CoreError::NotFound { entity: "Campaign", id }.into()),
            Err(err) if is_invite_code_collision(&err) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::InternalError(
        "Could not allocate a unique invite code".into(),
    ))
}

/// DELETE /api/v1/campaigns/{id}/characters/{character_id}
///
/// The owner may remove anyone; players only their own characters.
pub async fn remove_character(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, character_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let campaign = find_campaign(&state, id).await?;
    let character = CharacterRepo::find_by_id(&state.pool, character_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Character",
            id: character_id,
        })?;

    if !auth.is_admin()
        && !can_remove_character(auth.user_id, campaign.owner_id, character.owner_id)
    {
        return Err(CoreError::Forbidden(
            "You can only remove your own characters from this campaign".into(),
        )
        .into());
    }

    if !CampaignRepo::remove_character(&state.pool, id, character_id).await? {
        return Err(AppError::NotFound(
            "That character is not in this campaign".into(),
        ));
    }
    tracing::info!(campaign_id = id, character_id, "Character removed from campaign");
    Ok(StatusCode::NO_CONTENT)
}
