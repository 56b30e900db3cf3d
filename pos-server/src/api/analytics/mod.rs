//! Analytics API 模块 (需要 `reports:view`)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/analytics", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/daily-summary", get(handler::daily_summary))
        .route("/popular-items", get(handler::popular_items))
        .route("/sales-summary", get(handler::sales_summary))
        .route("/waiter-tips", get(handler::waiter_tips))
        .layer(middleware::from_fn(require_permission("reports:view")))
}
