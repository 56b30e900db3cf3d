//! Order API Handlers

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{AppResult, ValidatedJson};
use shared::models::{
    AreaQuery, DateRangeQuery, ItemStatusUpdate, Order, OrderCreate, OrderItemsUpdate,
    OrderPaymentRequest, OrderQuery, OrderSource, PartialPaymentRequest, PartialPaymentResult,
    PaymentResult, PopularItems, TablePaymentRequest,
};

// ========== 订单 ==========

/// GET /api/orders?status=&tableId=&area=&paid=&from=&to= - 订单列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list(query).await?))
}

/// GET /api/orders/:id - 获取单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(id).await?))
}

/// POST /api/orders - 下单 (按配方扣减库存)
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .create(payload, Some(current_user.id), OrderSource::Pos)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id - 替换仍在制作中的订单明细
pub async fn replace_items(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrderItemsUpdate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.replace_items(id, payload.items).await?))
}

/// PUT /api/orders/:id/items/:item_id - 更新单行出餐状态
pub async fn update_item_status(
    State(state): State<ServerState>,
    Path((id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<ItemStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .update_item_status(id, item_id, payload.status)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/send-to-cashier - 送收银
pub async fn send_to_cashier(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.send_to_cashier(id).await?))
}

/// PUT /api/orders/send-all-to-cashier/:table_id - 整桌送收银
pub async fn send_all_to_cashier(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.send_all_to_cashier(table_id).await?))
}

// ========== 查询 ==========

/// GET /api/orders/area?area=kitchen|bar - 区域出餐队列
pub async fn by_area(
    State(state): State<ServerState>,
    Query(query): Query<AreaQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.for_area(query.area).await?))
}

/// GET /api/orders/popular?startDate=&endDate= - 热销菜品
pub async fn popular(
    State(state): State<ServerState>,
    Query(range): Query<DateRangeQuery>,
) -> AppResult<Json<PopularItems>> {
    Ok(Json(state.orders.popular(range).await?))
}

/// GET /api/orders/payment/:table_id - 可结账订单
pub async fn payable_for_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.payable_for_table(table_id).await?))
}

// ========== 结账 ==========

/// POST /api/orders/payment/:table_id - 整桌结账
pub async fn pay_table(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(table_id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<TablePaymentRequest>,
) -> AppResult<Json<PaymentResult>> {
    let result = state
        .orders
        .pay_table(table_id, payload, Some(current_user.id))
        .await?;
    Ok(Json(result))
}

/// POST /api/orders/pay/:id - 单笔订单结账
pub async fn pay_order(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<OrderPaymentRequest>,
) -> AppResult<Json<PaymentResult>> {
    let result = state
        .orders
        .pay_order(id, payload, Some(current_user.id))
        .await?;
    Ok(Json(result))
}

/// POST /api/orders/partial-payment/:id - 部分付款
pub async fn partial_payment(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<PartialPaymentRequest>,
) -> AppResult<Json<PartialPaymentResult>> {
    let result = state
        .orders
        .partial_payment(id, payload, Some(current_user.id))
        .await?;
    Ok(Json(result))
}
