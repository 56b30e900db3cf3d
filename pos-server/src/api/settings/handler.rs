//! Setting API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::setting;
use crate::utils::{AppError, AppResult};
use shared::models::{Setting, SettingUpdate};

/// GET /api/settings/:key - 获取设置
pub async fn get_by_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<Json<Setting>> {
    let s = setting::find(&state.pool, &key)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Setting '{}'", key)))?;
    Ok(Json(s))
}

/// PUT /api/settings/:key - 写入设置
pub async fn update(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(payload): Json<SettingUpdate>,
) -> AppResult<Json<Setting>> {
    if key.trim().is_empty() || key.len() > 100 {
        return Err(AppError::validation("Setting key must be 1-100 characters"));
    }
    let s = setting::upsert(&state.pool, &key, &payload.value).await?;
    tracing::info!(key = %key, "Setting updated");
    Ok(Json(s))
}
