//! Menu API 模块 (分类与菜品)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/categories", get(handler::list_categories))
        .route("/items", get(handler::list_items))
        .route("/items/{id}", get(handler::get_item));

    let write_routes = Router::new()
        .route("/categories", post(handler::create_category))
        .route(
            "/categories/{id}",
            put(handler::update_category).delete(handler::delete_category),
        )
        .route("/items", post(handler::create_item))
        .route(
            "/items/{id}",
            put(handler::update_item).delete(handler::delete_item),
        )
        .layer(middleware::from_fn(require_permission("menu:manage")));

    read_routes.merge(write_routes)
}
