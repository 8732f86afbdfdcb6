//! Batch rewrite of stored character documents into the lean format.
//!
//! Shared by the admin endpoint and the `realms-tools lean-migrate`
//! command. Rows are walked in id order with keyset paging; each changed
//! document is normalized with [`prepare_for_save`] and written back on its
//! own, so one bad row never blocks the rest.

use realms_core::character::{migrate_to_lean, prepare_for_save};
use realms_core::error::CoreError;
use realms_core::types::DbId;
use serde::Serialize;

use crate::repositories::CharacterRepo;
use crate::DbPool;

/// Rows fetched per page.
pub const DEFAULT_BATCH_SIZE: i64 = 200;

#[derive(Debug, Clone, Serialize)]
pub struct LeanMigrationFailure {
    pub character_id: DbId,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LeanMigrationSummary {
    pub dry_run: bool,
    pub scanned: u64,
    pub migrated: u64,
    pub unchanged: u64,
    pub failures: Vec<LeanMigrationFailure>,
}

impl LeanMigrationSummary {
    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }
}

/// Typed round trip: unknown keys are dropped and the level clamped.
fn normalize(data: serde_json::Value) -> Result<(serde_json::Value, i32), CoreError> {
    let lean = prepare_for_save(data)?;
    let value = serde_json::to_value(&lean).map_err(|e| CoreError::Internal(e.to_string()))?;
    Ok((value, lean.level))
}

/// Migrate every character. With `dry_run` nothing is written but the
/// counts are the same as a real run would produce.
pub async fn run_lean_migration(
    pool: &DbPool,
    dry_run: bool,
    batch_size: i64,
) -> Result<LeanMigrationSummary, sqlx::Error> {
    let mut summary = LeanMigrationSummary {
        dry_run,
        ..Default::default()
    };
    let mut after_id = 0;

    loop {
        let page = CharacterRepo::list_documents_after(pool, after_id, batch_size.max(1)).await?;
        let Some(last) = page.last() else {
            break;
        };
        after_id = last.id;

        for doc in page {
            summary.scanned += 1;
            let mut data = doc.data;

            let report = match migrate_to_lean(&mut data) {
                Ok(report) => report,
                Err(err) => {
                    summary.failures.push(LeanMigrationFailure {
                        character_id: doc.id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if !report.changed() {
                summary.unchanged += 1;
                continue;
            }

            let (lean, level) = match normalize(data) {
                Ok(normalized) => normalized,
                Err(err) => {
                    summary.failures.push(LeanMigrationFailure {
                        character_id: doc.id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };

            if !dry_run {
                if let Err(err) = CharacterRepo::replace_data(pool, doc.id, &lean, level).await {
                    tracing::warn!(character_id = doc.id, error = %err, "Character write failed");
                    summary.failures.push(LeanMigrationFailure {
                        character_id: doc.id,
                        error: err.to_string(),
                    });
                    continue;
                }
            }
            tracing::debug!(
                character_id = doc.id,
                changes = ?report.changes,
                dry_run,
                "Character migrated"
            );
            summary.migrated += 1;
        }
    }

    tracing::info!(
        dry_run,
        scanned = summary.scanned,
        migrated = summary.migrated,
        unchanged = summary.unchanged,
        failed = summary.failed(),
        "Lean character migration finished"
    );
    Ok(summary)
}
