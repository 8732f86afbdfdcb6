//! Repository for the `codex_*` tables.
//!
//! Every codex table has the same shape, so one repository serves all of
//! them; the table name comes from [`CodexKind::table`], never from input.

use realms_core::codex::CodexKind;
use sqlx::PgPool;

use crate::models::codex::{CodexEntry, UpsertCodexEntry};

const COLUMNS: &str = "id, code, name, data, created_at, updated_at";

pub struct CodexRepo;

impl CodexRepo {
    /// All rows of one kind, ordered by name.
    pub async fn list(pool: &PgPool, kind: CodexKind) -> Result<Vec<CodexEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY lower(name) ASC, code ASC",
            kind.table()
        );
        sqlx::query_as::<_, CodexEntry>(&query).fetch_all(pool).await
    }

    pub async fn find_by_code(
        pool: &PgPool,
        kind: CodexKind,
        code: &str,
    ) -> Result<Option<CodexEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE code = $1", kind.table());
        sqlx::query_as::<_, CodexEntry>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Row counts per kind, in [`CodexKind::ALL`] order.
    pub async fn counts(pool: &PgPool) -> Result<Vec<(CodexKind, i64)>, sqlx::Error> {
        let mut counts = Vec::with_capacity(CodexKind::ALL.len());
        for kind in CodexKind::ALL {
            let query = format!("SELECT COUNT(*) FROM {}", kind.table());
            let (count,): (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
            counts.push((kind, count));
        }
        Ok(counts)
    }

    pub async fn upsert(
        pool: &PgPool,
        kind: CodexKind,
        input: &UpsertCodexEntry,
    ) -> Result<CodexEntry, sqlx::Error> {
        sqlx::query_as::<_, CodexEntry>(&upsert_query(kind))
            .bind(&input.code)
            .bind(&input.name)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    /// Upsert a whole import in one transaction; nothing is written if any
    /// row fails.
    pub async fn bulk_upsert(
        pool: &PgPool,
        kind: CodexKind,
        entries: &[UpsertCodexEntry],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = upsert_query(kind);

        for entry in entries {
            sqlx::query_as::<_, CodexEntry>(&query)
                .bind(&entry.code)
                .bind(&entry.name)
                .bind(&entry.data)
                .fetch_one(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(table = kind.table(), rows = entries.len(), "Codex import committed");
        Ok(entries.len() as u64)
    }

    pub async fn delete(pool: &PgPool, kind: CodexKind, code: &str) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE code = $1", kind.table());
        let result = sqlx::query(&query).bind(code).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn upsert_query(kind: CodexKind) -> String {
    format!(
        "INSERT INTO {table} (code, name, data)
         VALUES ($1, $2, $3)
         ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name, data = EXCLUDED.data
         RETURNING {COLUMNS}",
        table = kind.table()
    )
}
