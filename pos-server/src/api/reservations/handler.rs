//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{Reservation, ReservationCreate, ReservationStatusUpdate};

/// GET /api/reservations - 获取所有预订
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Reservation>>> {
    Ok(Json(state.tables.list_reservations().await?))
}

/// POST /api/reservations - 预订空闲桌台
pub async fn create(
    State(state): State<ServerState>,
    ValidatedJson(payload): ValidatedJson<ReservationCreate>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(state.tables.create_reservation(payload).await?))
}

/// PUT /api/reservations/:id/status - 入座 / 完成
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationStatusUpdate>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(
        state
            .tables
            .update_reservation_status(id, payload.status)
            .await?,
    ))
}
