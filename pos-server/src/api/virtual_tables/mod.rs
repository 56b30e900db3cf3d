//! Virtual Table API 模块
//!
//! 结构调整 (创建、批量生成、拼桌增减、停用) 需要 `tables:manage`,
//! 开台 / 关台登录即可。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/virtual-tables", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/available-tables", get(handler::available_tables))
        .route("/{id}", get(handler::get_by_id))
        .route(
            "/{id}/session",
            post(handler::start_session).delete(handler::close_session),
        );

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/generate-multiple", post(handler::generate))
        .route("/{id}/add-table", post(handler::add_table))
        .route("/{id}/remove-table/{table_id}", delete(handler::remove_table))
        .route("/{id}/deactivate", post(handler::deactivate))
        .layer(middleware::from_fn(require_permission("tables:manage")));

    read_routes.merge(manage_routes)
}
