//! Repository for the `characters` table.

use realms_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::{
    Character, CharacterDocument, CharacterSummary, CreateCharacter, UpdateCharacter,
};

const COLUMNS: &str = "id, owner_id, name, level, visibility, data, created_at, updated_at";

const SUMMARY_COLUMNS: &str = "id, owner_id, name, level, visibility, updated_at";

pub struct CharacterRepo;

impl CharacterRepo {
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (owner_id, name, level, visibility, data)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(input.level)
            .bind(&input.visibility)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's characters, most recently edited first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<CharacterSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM characters
             WHERE owner_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, CharacterSummary>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Only non-`None` fields are applied. Returns `None` if the row is gone.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE($2, name),
                level = COALESCE($3, level),
                visibility = COALESCE($4, visibility),
                data = COALESCE($5, data)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.level)
            .bind(&input.visibility)
            .bind(&input.data)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Keyset page of stored documents with `id > after_id`, for batch jobs.
    pub async fn list_documents_after(
        pool: &PgPool,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<CharacterDocument>, sqlx::Error> {
        sqlx::query_as::<_, CharacterDocument>(
            "SELECT id, data FROM characters WHERE id > $1 ORDER BY id ASC LIMIT $2",
        )
        .bind(after_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Overwrite a stored document without touching other columns.
    pub async fn replace_data(
        pool: &PgPool,
        id: DbId,
        data: &serde_json::Value,
        level: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE characters SET data = $2, level = $3 WHERE id = $1")
            .bind(id)
            .bind(data)
            .bind(level)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
