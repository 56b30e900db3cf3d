//! Analytics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::analytics;
use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{DailySummary, DateRangeQuery, PopularItems, SalesSummary, WaiterTips};

/// GET /api/analytics/daily-summary - 当日汇总 (UTC)
pub async fn daily_summary(State(state): State<ServerState>) -> AppResult<Json<DailySummary>> {
    Ok(Json(analytics::daily_summary(&state.pool).await?))
}

/// GET /api/analytics/popular-items?startDate=&endDate= - 热销菜品
pub async fn popular_items(
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<PopularItems>> {
    Ok(Json(analytics::popular_items(&state.pool, range).await?))
}

/// GET /api/analytics/sales-summary?startDate=&endDate= - 销售汇总
pub async fn sales_summary(
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<SalesSummary>> {
    Ok(Json(analytics::sales_summary(&state.pool, range).await?))
}

/// GET /api/analytics/waiter-tips?startDate=&endDate= - 服务员小费
pub async fn waiter_tips(
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<Vec<WaiterTips>>> {
    Ok(Json(analytics::waiter_tips(&state.pool, range).await?))
}
