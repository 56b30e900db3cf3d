use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::catalog::CatalogService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderService;
use crate::services::{EventPublisher, MessageBus};
use crate::tables::{SessionService, TableService, VirtualTableService};
use crate::users::UserService;
use crate::utils::AppResult;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是 `Arc` 或内部带 `Arc` 的句柄，克隆成本极低，
/// 作为 axum 的 `State` 注入到每个处理器。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | message_bus | MessageBus | 领域事件总线 |
/// | users | UserService | 用户、登录、角色 |
/// | catalog | CatalogService | 菜单与库存 |
/// | tables | TableService | 桌台、分区、预订 |
/// | sessions | SessionService | 桌台会话 |
/// | virtual_tables | VirtualTableService | 虚拟桌台 |
/// | orders | OrderService | 订单与支付 |
///
/// # 使用示例
///
/// ```ignore
/// let state = ServerState::initialize(&config).await?;
/// let orders = state.orders.list(OrderQuery::default()).await?;
/// ```
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 数据库连接池
    pub pool: SqlitePool,
    /// JWT 服务
    pub jwt_service: Arc<JwtService>,
    /// 消息总线
    pub message_bus: MessageBus,
    pub users: UserService,
    pub catalog: CatalogService,
    pub tables: TableService,
    pub sessions: SessionService,
    pub virtual_tables: VirtualTableService,
    pub orders: OrderService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 打开数据库并执行迁移
    /// 2. 创建 JWT 服务与消息总线
    /// 3. 构造各业务服务 (共享同一个事件发布者)
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::with_pool(config.clone(), db.pool))
    }

    /// 基于已打开的连接池构造状态
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let message_bus = MessageBus::new();
        let events: Arc<dyn EventPublisher> = Arc::new(message_bus.clone());

        Self {
            users: UserService::new(
                pool.clone(),
                jwt_service.clone(),
                config.master_password.clone(),
            ),
            catalog: CatalogService::new(pool.clone(), events.clone()),
            tables: TableService::new(pool.clone(), events.clone()),
            sessions: SessionService::new(pool.clone(), events.clone()),
            virtual_tables: VirtualTableService::new(pool.clone(), events.clone()),
            orders: OrderService::new(pool.clone(), events),
            config,
            pool,
            jwt_service,
            message_bus,
        }
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 获取消息总线
    pub fn message_bus(&self) -> &MessageBus {
        &self.message_bus
    }
}
