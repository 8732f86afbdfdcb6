//! Campaign models and DTOs.

use realms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: String,
    pub invite_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A character enrolled in a campaign, with its owner resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignMember {
    pub character_id: DbId,
    pub character_name: String,
    pub level: i32,
    pub owner_id: DbId,
    pub owner_username: String,
    pub joined_at: Timestamp,
}

pub struct CreateCampaign {
    pub owner_id: DbId,
    pub name: String,
    pub description: String,
    pub invite_code: String,
}

#[derive(Debug, Default)]
pub struct UpdateCampaign {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Result of joining a campaign by invite code.
#[derive(Debug)]
pub enum JoinOutcome {
    Joined(Campaign),
    UnknownCode,
    CharacterNotOwned,
}
