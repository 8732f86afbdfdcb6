//! Repository for `users` and the `usernames` lookup table.

use realms_core::types::{DbId, Timestamp};
use realms_core::username::normalize;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, UserResponse};

const COLUMNS: &str = "id, username, email, password_hash, role_id, is_active, \
                        last_login_at, failed_login_count, locked_until, username_changed_at, \
                        created_at, updated_at";

/// [`UserResponse`] columns, selected from `users u JOIN roles r`.
const RESPONSE_COLUMNS: &str = "u.id, u.username, u.email, r.name AS role, u.is_active, \
                                 u.last_login_at, u.username_changed_at, u.created_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a user and claim its username in the lookup table.
    ///
    /// A taken username or email fails with a unique violation on
    /// `uq_usernames_username_lower` or `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (username, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.role_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO usernames (username_lower, user_id) VALUES ($1, $2)")
            .bind(normalize(&input.username))
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username, case-insensitively, through the lookup table.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE id = (SELECT user_id FROM usernames WHERE username_lower = $1)"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(normalize(username))
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email, case-insensitively.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// Resolve a login identifier: an email if it contains `@`, otherwise a
    /// username.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        if login.contains('@') {
            Self::find_by_email(pool, login).await
        } else {
            Self::find_by_username(pool, login).await
        }
    }

    pub async fn find_response_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.id = $1"
        );
        sqlx::query_as::<_, UserResponse>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all users, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<UserResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             ORDER BY u.created_at DESC, u.id DESC"
        );
        sqlx::query_as::<_, UserResponse>(&query).fetch_all(pool).await
    }

    /// Returns `None` if no user with `id` exists.
    pub async fn update_role(
        pool: &PgPool,
        id: DbId,
        role_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("UPDATE users SET role_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(role_id)
            .fetch_optional(pool)
            .await
    }

    /// Swap a user's username and its lookup row in one transaction.
    ///
    /// The lookup row is rewritten first so a taken name fails with a unique
    /// violation on `uq_usernames_username_lower` before `users` is touched.
    /// Returns `None` if the user does not exist.
    pub async fn change_username(
        pool: &PgPool,
        id: DbId,
        new_username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO usernames (username_lower, user_id) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE SET username_lower = EXCLUDED.username_lower",
        )
        .bind(normalize(new_username))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE users SET username = $2, username_changed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(new_username)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Whether a username is free, ignoring the user's own current claim.
    pub async fn is_username_available(
        pool: &PgPool,
        username: &str,
        except_user_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let taken: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM usernames
                WHERE username_lower = $1
                  AND ($2::BIGINT IS NULL OR user_id <> $2)
            )",
        )
        .bind(normalize(username))
        .bind(except_user_id)
        .fetch_one(pool)
        .await?;
        Ok(!taken.0)
    }

    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<i32, sqlx::Error> {
        let count: (i32,) = sqlx::query_as(
            "UPDATE users SET failed_login_count = failed_login_count + 1
             WHERE id = $1
             RETURNING failed_login_count",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// Lock an account until `until` and reset the failure counter.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2, failed_login_count = 0 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Reset the failure counter, clear any lock and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
