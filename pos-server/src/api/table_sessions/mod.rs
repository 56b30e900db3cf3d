//! Table Session API 模块
//!
//! 开台、待结账、关台。基础操作, 登录即可使用。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tableSession", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::open))
        .route("/open", get(handler::list_open))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/mark-ready", put(handler::mark_ready))
        .route("/{id}/close", put(handler::close))
        .route("/close-by-table/{table_id}", put(handler::close_by_table))
}
