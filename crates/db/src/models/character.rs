//! Character entity model and DTOs.

use realms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `characters` table. `data` is the lean character
/// document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub level: i32,
    pub visibility: String,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing row without the document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterSummary {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub level: i32,
    pub visibility: String,
    pub updated_at: Timestamp,
}

/// Just the id and stored document, for batch migration.
#[derive(Debug, Clone, FromRow)]
pub struct CharacterDocument {
    pub id: DbId,
    pub data: serde_json::Value,
}

pub struct CreateCharacter {
    pub owner_id: DbId,
    pub name: String,
    pub level: i32,
    pub visibility: String,
    pub data: serde_json::Value,
}

/// Patch for a character. `level` is denormalized from `data` and should be
/// set whenever `data` is.
#[derive(Debug, Default)]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub level: Option<i32>,
    pub visibility: Option<String>,
    pub data: Option<serde_json::Value>,
}
