//! Order API 模块
//!
//! 下单、出餐状态、送收银登录即可；结账需要 `payments:process`。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    let order_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/area", get(handler::by_area))
        .route("/popular", get(handler::popular))
        .route("/payment/{table_id}", get(handler::payable_for_table))
        .route("/send-all-to-cashier/{table_id}", put(handler::send_all_to_cashier))
        .route("/{id}", get(handler::get_by_id).put(handler::replace_items))
        .route("/{id}/items/{item_id}", put(handler::update_item_status))
        .route("/{id}/send-to-cashier", put(handler::send_to_cashier));

    let payment_routes = Router::new()
        .route("/payment/{table_id}", post(handler::pay_table))
        .route("/pay/{id}", post(handler::pay_order))
        .route("/partial-payment/{id}", post(handler::partial_payment))
        .layer(middleware::from_fn(require_permission("payments:process")));

    order_routes.merge(payment_routes)
}
