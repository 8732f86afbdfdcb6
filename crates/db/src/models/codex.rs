//! Codex row model and upsert DTO, shared by every `codex_*` table.

use realms_core::codex::CodexRecord;
use realms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CodexEntry {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert-or-replace payload keyed by `code`.
#[derive(Debug, Clone)]
pub struct UpsertCodexEntry {
    pub code: String,
    pub name: String,
    pub data: serde_json::Value,
}

impl From<CodexRecord> for UpsertCodexEntry {
    fn from(record: CodexRecord) -> Self {
        Self {
            code: record.code,
            name: record.name,
            data: serde_json::Value::Object(record.data),
        }
    }
}
