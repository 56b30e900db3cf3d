//! POS Server - 餐厅点餐收银后端
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT + Argon2，密码登录与 PIN 登录
//! - **数据库** (`db`): SQLite (sqlx) 连接池、迁移与仓储函数
//! - **目录** (`catalog`): 菜单、库存与配方扣减
//! - **桌台** (`tables`): 桌台会话与虚拟桌台
//! - **订单** (`orders`): 下单、出餐状态、结账
//! - **消息** (`services`): 领域事件总线与 Socket.IO 广播
//! - **机器人** (`bot`): Telegram 点餐通道
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── db/            # 数据库层
//! ├── catalog/       # 单位换算、库存扣减
//! ├── tables/        # 会话、虚拟桌台
//! ├── orders/        # 订单与支付
//! ├── analytics/     # 报表聚合
//! ├── bot/           # Telegram 机器人
//! ├── services/      # 消息总线、事件发布
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验、提取器
//! ```

pub mod analytics;
pub mod api;
pub mod auth;
pub mod bot;
pub mod catalog;
pub mod core;
pub mod db;
pub mod order_money;
pub mod orders;
pub mod services;
pub mod tables;
pub mod users;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 .env 并初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____
   / __ \/ __ \/ ___/
  / /_/ / / / /\__ \
 / ____/ /_/ /___/ /
/_/    \____//____/
    "#
    );
}
