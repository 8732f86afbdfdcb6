//! Repository for the `encounters` table.

use realms_core::types::DbId;
use sqlx::PgPool;

use crate::models::encounter::{CreateEncounter, Encounter, UpdateEncounter};

const COLUMNS: &str = "id, owner_id, campaign_id, name, state, created_at, updated_at";

pub struct EncounterRepo;

impl EncounterRepo {
    pub async fn create(pool: &PgPool, input: &CreateEncounter) -> Result<Encounter, sqlx::Error> {
        let query = format!(
            "INSERT INTO encounters (owner_id, campaign_id, name, state)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Encounter>(&query)
            .bind(input.owner_id)
            .bind(input.campaign_id)
            .bind(&input.name)
            .bind(&input.state)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Encounter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM encounters WHERE id = $1");
        sqlx::query_as::<_, Encounter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<Encounter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM encounters
             WHERE owner_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Encounter>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEncounter,
    ) -> Result<Option<Encounter>, sqlx::Error> {
        let query = format!(
            "UPDATE encounters SET
                name = COALESCE($2, name),
                campaign_id = CASE WHEN $3 THEN $4 ELSE campaign_id END,
                state = COALESCE($5, state)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Encounter>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.campaign_id.is_some())
            .bind(input.campaign_id.flatten())
            .bind(&input.state)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM encounters WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
