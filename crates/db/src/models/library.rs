//! Library entry model and DTOs.

use realms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `library_entries`. `owner_id` is `None` for public entries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LibraryEntry {
    pub id: DbId,
    pub kind: String,
    pub owner_id: Option<DbId>,
    /// Entry this one was copied from, if any.
    pub source_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateLibraryEntry {
    pub kind: String,
    pub owner_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct UpdateLibraryEntry {
    pub name: Option<String>,
    pub description: Option<String>,
    pub payload: Option<serde_json::Value>,
}
