//! Repository for `campaigns` and `campaign_characters`.

use realms_core::types::DbId;
use sqlx::PgPool;

use crate::models::campaign::{
    Campaign, CampaignMember, CreateCampaign, JoinOutcome, UpdateCampaign,
};

const COLUMNS: &str = "id, owner_id, name, description, invite_code, created_at, updated_at";

pub struct CampaignRepo;

impl CampaignRepo {
    pub async fn create(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (owner_id, name, description, invite_code)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.invite_code)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Campaigns the user owns or has a character in.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns
             WHERE owner_id = $1
                OR id IN (
                    SELECT cc.campaign_id
                    FROM campaign_characters cc
                    JOIN characters ch ON ch.id = cc.character_id
                    WHERE ch.owner_id = $1
                )
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the user owns the campaign or has a character in it.
    pub async fn is_participant(
        pool: &PgPool,
        campaign_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM campaigns WHERE id = $1 AND owner_id = $2
                UNION ALL
                SELECT 1 FROM campaign_characters cc
                JOIN characters ch ON ch.id = cc.character_id
                WHERE cc.campaign_id = $1 AND ch.owner_id = $2
            )",
        )
        .bind(campaign_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_invite_code(
        pool: &PgPool,
        id: DbId,
        invite_code: &str,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query =
            format!("UPDATE campaigns SET invite_code = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(invite_code)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Enrol `character_id` into the campaign behind `invite_code`.
    ///
    /// Ownership of the character is checked inside the same transaction as
    /// the insert. Joining twice is a no-op.
    pub async fn join(
        pool: &PgPool,
        invite_code: &str,
        character_id: DbId,
        user_id: DbId,
    ) -> Result<JoinOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE invite_code = $1 FOR SHARE");
        let Some(campaign) = sqlx::query_as::<_, Campaign>(&query)
            .bind(invite_code)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(JoinOutcome::UnknownCode);
        };

        let owned: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM characters WHERE id = $1 AND owner_id = $2 FOR SHARE")
                .bind(character_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            return Ok(JoinOutcome::CharacterNotOwned);
        }

        sqlx::query(
            "INSERT INTO campaign_characters (campaign_id, character_id) VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_campaign_characters_campaign_character DO NOTHING",
        )
        .bind(campaign.id)
        .bind(character_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(JoinOutcome::Joined(campaign))
    }

    pub async fn list_members(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<CampaignMember>, sqlx::Error> {
        sqlx::query_as::<_, CampaignMember>(
            "SELECT ch.id AS character_id, ch.name AS character_name, ch.level,
                    ch.owner_id, u.username AS owner_username, cc.created_at AS joined_at
             FROM campaign_characters cc
             JOIN characters ch ON ch.id = cc.character_id
             JOIN users u ON u.id = ch.owner_id
             WHERE cc.campaign_id = $1
             ORDER BY cc.created_at ASC, ch.id ASC",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await
    }

    /// Returns `true` if the character was enrolled and is now removed.
    pub async fn remove_character(
        pool: &PgPool,
        campaign_id: DbId,
        character_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM campaign_characters WHERE campaign_id = $1 AND character_id = $2",
        )
        .bind(campaign_id)
        .bind(character_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
