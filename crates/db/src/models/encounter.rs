//! Encounter model and DTOs.

use realms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `encounters`. `state` holds the serialized tracker state.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Encounter {
    pub id: DbId,
    pub owner_id: DbId,
    pub campaign_id: Option<DbId>,
    pub name: String,
    pub state: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateEncounter {
    pub owner_id: DbId,
    pub campaign_id: Option<DbId>,
    pub name: String,
    pub state: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct UpdateEncounter {
    pub name: Option<String>,
    /// `Some(None)` clears the campaign link.
    pub campaign_id: Option<Option<DbId>>,
    pub state: Option<serde_json::Value>,
}
