//! Table Session API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{SessionOpen, SessionWithOrders, TableSession};

/// POST /api/tableSession - 开台
pub async fn open(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<SessionOpen>,
) -> AppResult<Json<TableSession>> {
    let session = state.sessions.open(payload, Some(current_user.id)).await?;
    Ok(Json(session))
}

/// GET /api/tableSession/open - 所有未关闭的会话
pub async fn list_open(State(state): State<ServerState>) -> AppResult<Json<Vec<TableSession>>> {
    Ok(Json(state.sessions.list_open().await?))
}

/// GET /api/tableSession/:id - 会话及其订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SessionWithOrders>> {
    Ok(Json(state.sessions.get_with_orders(id).await?))
}

/// PUT /api/tableSession/:id/mark-ready - 标记待结账
pub async fn mark_ready(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TableSession>> {
    Ok(Json(state.sessions.mark_ready(id).await?))
}

/// PUT /api/tableSession/:id/close - 关台 (有未付订单时拒绝)
pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<TableSession>> {
    Ok(Json(state.sessions.close(id).await?))
}

/// PUT /api/tableSession/close-by-table/:table_id - 按桌台关台
pub async fn close_by_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<TableSession>> {
    Ok(Json(state.sessions.close_by_table(table_id).await?))
}
