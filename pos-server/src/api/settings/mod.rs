//! Setting API 模块 (全局键值设置)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/{key}", get(handler::get_by_key));

    let write_routes = Router::new()
        .route("/{key}", put(handler::update))
        .layer(middleware::from_fn(require_permission("settings:manage")));

    read_routes.merge(write_routes)
}
