//! Handlers for `/me`: the caller's own profile and username changes.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use realms_core::error::CoreError;
use realms_core::username;
use realms_db::models::user::UserResponse;
use realms_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::RateLimit;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangeUsernameRequest {
    pub username: String,
}

async fn load_profile(state: &AppState, auth: &AuthUser) -> AppResult<UserResponse> {
    UserRepo::find_response_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            }
            .into()
        })
}

/// GET /api/v1/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let profile = load_profile(&state, &auth).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/me/username
///
/// Format and blocklist are checked first, then the cooldown (admins are
/// exempt), then availability. The lookup row and the profile are swapped
/// in one transaction; losing a race to another user surfaces as 409 from
/// the unique index.
pub async fn change_username(
    RateLimit(_): RateLimit,
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangeUsernameRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let new_name = input.username.trim();
    username::validate(new_name)?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        })?;

    if user.username == new_name {
        return Err(CoreError::Validation("That is already your username".into()).into());
    }

    username::check_change_allowed(user.username_changed_at, Utc::now(), auth.is_admin())?;

    if !UserRepo::is_username_available(&state.pool, new_name, Some(user.id)).await? {
        return Err(CoreError::Conflict("Username is already taken".into()).into());
    }

    UserRepo::change_username(&state.pool, user.id, new_name)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "User",
            id: user.id,
        })?;
    tracing::info!(
        user_id = user.id,
        old = %user.username,
        new = %new_name,
        "Username changed"
    );

    let profile = load_profile(&state, &auth).await?;
    Ok(Json(DataResponse { data: profile }))
}
