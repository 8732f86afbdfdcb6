//! Read-only codex browsing. Admin writes live in [`super::admin`].

use axum::extract::{Path, Query, State};
use axum::Json;
use realms_core::codex::{shape, CodexKind, CodexView};
use realms_db::repositories::CodexRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CodexKindSummary {
    pub kind: CodexKind,
    pub count: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CodexListParams {
    /// Case-insensitive substring match on the name.
    pub q: Option<String>,
}

/// GET /api/v1/codex
pub async fn list_kinds(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CodexKindSummary>>>> {
    let counts = CodexRepo::counts(&state.pool).await?;
    let data = counts
        .into_iter()
        .map(|(kind, count)| CodexKindSummary { kind, count })
        .collect();
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/codex/{kind}
pub async fn list(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<CodexListParams>,
) -> AppResult<Json<DataResponse<Vec<CodexView>>>> {
    let kind = CodexKind::from_path(&kind)?;
    let needle = params
        .q
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let rows = CodexRepo::list(&state.pool, kind).await?;
    let views: Vec<CodexView> = rows
        .iter()
        .filter(|row| {
            needle
                .as_deref()
                .is_none_or(|n| row.name.to_lowercase().contains(n))
        })
        .map(|row| shape(kind, &row.code, &row.name, &row.data))
        .collect();
    tracing::debug!(kind = kind.as_str(), count = views.len(), "Listed codex entries");
    Ok(Json(DataResponse { data: views }))
}

/// GET /api/v1/codex/{kind}/{code}
pub async fn get_by_code(
    State(state): State<AppState>,
    Path((kind, code)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<CodexView>>> {
    let kind = CodexKind::from_path(&kind)?;
    let row = CodexRepo::find_by_code(&state.pool, kind, &code)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No {} entry with code '{code}'", kind.as_str()))
        })?;
    Ok(Json(DataResponse {
        data: shape(kind, &row.code, &row.name, &row.data),
    }))
}
