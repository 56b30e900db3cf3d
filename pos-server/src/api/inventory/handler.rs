//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{InventoryItem, InventoryItemCreate, InventoryItemUpdate};

/// GET /api/inventory - 获取全部库存
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.catalog.list_inventory().await?))
}

/// GET /api/inventory/:id - 获取单个库存项
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InventoryItem>> {
    Ok(Json(state.catalog.get_inventory(id).await?))
}

/// POST /api/inventory - 新增库存项
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<InventoryItemCreate>,
) -> AppResult<Json<InventoryItem>> {
    Ok(Json(state.catalog.create_inventory(payload).await?))
}

/// PUT /api/inventory/:id - 更新库存项
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<InventoryItemUpdate>,
) -> AppResult<Json<InventoryItem>> {
    Ok(Json(state.catalog.update_inventory(id, payload).await?))
}

/// DELETE /api/inventory/:id - 删除库存项
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    state.catalog.delete_inventory(id).await?;
    Ok(Json(true))
}
