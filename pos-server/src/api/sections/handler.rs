//! Section API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{
    DiningTable, DiningTableCreate, Section, SectionCreate, SectionUpdate, SectionWithTables,
};

/// GET /api/sections - 获取所有分区及其桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<SectionWithTables>>> {
    Ok(Json(state.tables.list_sections().await?))
}

/// GET /api/sections/:id - 获取单个分区
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SectionWithTables>> {
    Ok(Json(state.tables.get_section(id).await?))
}

/// POST /api/sections - 创建分区
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<SectionCreate>,
) -> AppResult<Json<Section>> {
    Ok(Json(state.tables.create_section(&payload.name).await?))
}

/// PUT /api/sections/:id - 重命名分区
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<SectionUpdate>,
) -> AppResult<Json<Section>> {
    Ok(Json(state.tables.rename_section(id, &payload.name).await?))
}

/// DELETE /api/sections/:id - 删除分区 (桌台保留, 脱离分区)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.tables.delete_section(id).await?;
    Ok(Json(true))
}

/// POST /api/sections/:id/tables - 在分区内创建桌台
pub async fn add_table(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.create_table_in_section(id, payload).await?))
}
