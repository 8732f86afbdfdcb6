//! Repository for `library_entries` (user and public libraries).

use realms_core::types::DbId;
use sqlx::PgPool;

use crate::models::library::{CreateLibraryEntry, LibraryEntry, UpdateLibraryEntry};

const COLUMNS: &str =
    "id, kind, owner_id, source_id, name, description, payload, created_at, updated_at";

pub struct LibraryRepo;

impl LibraryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateLibraryEntry,
    ) -> Result<LibraryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO library_entries (kind, owner_id, name, description, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(&input.kind)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.payload)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<LibraryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM library_entries WHERE id = $1");
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Entries of `kind` owned by `owner_id`, or the public library when
    /// `owner_id` is `None`. Ordered by name.
    pub async fn list(
        pool: &PgPool,
        kind: &str,
        owner_id: Option<DbId>,
    ) -> Result<Vec<LibraryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM library_entries
             WHERE kind = $1 AND owner_id IS NOT DISTINCT FROM $2
             ORDER BY lower(name) ASC, id ASC"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(kind)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Entries among `ids` that `owner_id` may use: their own or public.
    pub async fn find_usable_by_ids(
        pool: &PgPool,
        owner_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<LibraryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM library_entries
             WHERE id = ANY($1) AND (owner_id = $2 OR owner_id IS NULL)"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(ids)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLibraryEntry,
    ) -> Result<Option<LibraryEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE library_entries SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                payload = COALESCE($4, payload)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.payload)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM library_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Copy a public entry into `owner_id`'s library, recording the source.
    ///
    /// Returns `None` if `source_id` is not a public entry.
    pub async fn copy_public_to_owner(
        pool: &PgPool,
        source_id: DbId,
        owner_id: DbId,
    ) -> Result<Option<LibraryEntry>, sqlx::Error> {
        let query = format!(
            "INSERT INTO library_entries (kind, owner_id, source_id, name, description, payload)
             SELECT kind, $2, id, name, description, payload
             FROM library_entries
             WHERE id = $1 AND owner_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(source_id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }
}
