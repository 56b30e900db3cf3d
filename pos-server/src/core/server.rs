//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use http::HeaderValue;
use socketioxide::SocketIo;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::bot::{self, BotHandler, BotTransport, TelegramApi};
use crate::core::{Config, ServerState};
use crate::services::socket;

/// 组装全部 API 路由 (未绑定状态)
fn api_routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::health::router())
        .merge(crate::api::users::router())
        .merge(crate::api::settings::router())
        // Catalog
        .merge(crate::api::menu::router())
        .merge(crate::api::inventory::router())
        // Tables
        .merge(crate::api::tables::router())
        .merge(crate::api::sections::router())
        .merge(crate::api::reservations::router())
        .merge(crate::api::table_sessions::router())
        .merge(crate::api::virtual_tables::router())
        // Orders
        .merge(crate::api::orders::router())
        .merge(crate::api::analytics::router())
}

/// Build the Axum app with state, auth and tower-http layers
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);
    let cors = cors_layer(&state.config.cors_origins);

    api_routes()
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Socket.IO: 总线上的领域事件广播给所有客户端
        let (socket_layer, io) = SocketIo::new_layer();
        socket::register_namespace(&io, state.message_bus());
        socket::spawn_forwarder(io, state.message_bus());

        self.spawn_bot(&state);

        let app = build_app(state.clone()).layer(socket_layer);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🍽️ POS server starting on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        state.message_bus().shutdown();
        Ok(())
    }

    /// 配置了 TELEGRAM_BOT_TOKEN 时启动机器人长轮询
    fn spawn_bot(&self, state: &ServerState) {
        let Some(token) = self.config.telegram_bot_token.as_deref() else {
            tracing::info!("TELEGRAM_BOT_TOKEN not set, Telegram bot disabled");
            return;
        };

        let api = match TelegramApi::new(token) {
            Ok(api) => api,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create Telegram client, bot disabled");
                return;
            }
        };
        let transport: Arc<dyn BotTransport> = Arc::new(api);
        let handler = BotHandler::new(state.pool.clone(), state.orders.clone());
        let shutdown = state.message_bus().shutdown_token().clone();

        tokio::spawn(bot::run_polling(transport, handler, shutdown));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_cors_origins_are_skipped() {
        // 不应 panic
        let _ = cors_layer(&["http://pos.local".to_string(), "bad\norigin".to_string()]);
        let _ = cors_layer(&[]);
    }
}
