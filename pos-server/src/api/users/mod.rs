//! User / Auth API 模块
//!
//! 公共路由 (signup, login, login-pin, admin-access, exists, first-admin)
//! 由 `require_auth` 放行；`first-admin` 自行校验引导令牌。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/signup", post(handler::signup))
        .route("/login", post(handler::login))
        .route("/login-pin", post(handler::login_pin))
        .route("/admin-access", post(handler::admin_access))
        .route("/first-admin", post(handler::first_admin))
        .route("/exists", get(handler::exists));

    // 登录即可
    let self_routes = Router::new()
        .route("/profile", get(handler::profile).put(handler::update_profile))
        .route("/settings", get(handler::settings).put(handler::update_settings));

    let manage_routes = Router::new()
        .route("/", get(handler::list))
        .route("/pins", get(handler::list_pins).post(handler::generate_pin))
        .route("/roles", get(handler::list_roles).post(handler::create_role))
        .route("/roles/assign-permissions", post(handler::assign_permissions))
        .route(
            "/permissions",
            get(handler::list_permissions).post(handler::create_permission),
        )
        .route("/groups", get(handler::list_groups).post(handler::create_group))
        .layer(middleware::from_fn(require_permission("users:manage")));

    public_routes.merge(self_routes).merge(manage_routes)
}
