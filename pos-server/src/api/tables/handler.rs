//! Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatusUpdate};

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(state.tables.list().await?))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.get(id).await?))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.create(payload).await?))
}

/// PUT /api/tables/:id - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.update(id, payload).await?))
}

/// PUT /api/tables/:id/status - 更新桌台状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TableStatusUpdate>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.update_status(id, payload.status).await?))
}

/// DELETE /api/tables/:id - 删除桌台 (使用中拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.tables.delete(id).await?;
    Ok(Json(true))
}
