//! Virtual Table API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{
    AddPhysicalTable, DiningTable, GenerateVirtualTables, TableSession, VirtualSessionStart,
    VirtualTable, VirtualTableCreate, VirtualTableQuery,
};

/// GET /api/virtual-tables?active= - 虚拟桌台列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<VirtualTableQuery>,
) -> AppResult<Json<Vec<VirtualTable>>> {
    Ok(Json(state.virtual_tables.list(query.active).await?))
}

/// GET /api/virtual-tables/available-tables - 可拼桌的物理桌台
pub async fn available_tables(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(state.virtual_tables.available_physical_tables().await?))
}

/// GET /api/virtual-tables/:id - 获取单个虚拟桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<VirtualTable>> {
    Ok(Json(state.virtual_tables.get(id).await?))
}

/// POST /api/virtual-tables - 创建独立或拼桌虚拟桌台
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<VirtualTableCreate>,
) -> AppResult<Json<VirtualTable>> {
    let vt = state
        .virtual_tables
        .create(payload, Some(current_user.id))
        .await?;
    Ok(Json(vt))
}

/// POST /api/virtual-tables/generate-multiple - 批量生成独立虚拟桌台
pub async fn generate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<GenerateVirtualTables>,
) -> AppResult<Json<Vec<VirtualTable>>> {
    let created = state
        .virtual_tables
        .generate(payload, Some(current_user.id))
        .await?;
    Ok(Json(created))
}

/// POST /api/virtual-tables/:id/add-table - 拼入物理桌台
pub async fn add_table(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddPhysicalTable>,
) -> AppResult<Json<VirtualTable>> {
    let vt = state
        .virtual_tables
        .add_physical_table(id, payload.table_id)
        .await?;
    Ok(Json(vt))
}

/// DELETE /api/virtual-tables/:id/remove-table/:table_id - 移出物理桌台
pub async fn remove_table(
    State(state): State<ServerState>,
    Path((id, table_id)): Path<(i64, i64)>,
) -> AppResult<Json<VirtualTable>> {
    let vt = state
        .virtual_tables
        .remove_physical_table(id, table_id)
        .await?;
    Ok(Json(vt))
}

/// POST /api/virtual-tables/:id/session - 虚拟桌台开台
pub async fn start_session(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<VirtualSessionStart>,
) -> AppResult<Json<TableSession>> {
    let session = state
        .virtual_tables
        .start_session(id, payload, Some(current_user.id))
        .await?;
    Ok(Json(session))
}

/// DELETE /api/virtual-tables/:id/session - 虚拟桌台关台
pub async fn close_session(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TableSession>> {
    Ok(Json(state.virtual_tables.close_session(id).await?))
}

/// POST /api/virtual-tables/:id/deactivate - 停用并归还物理桌台
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<VirtualTable>> {
    Ok(Json(state.virtual_tables.deactivate(id).await?))
}
