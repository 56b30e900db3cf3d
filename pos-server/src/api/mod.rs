//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`users`] - 登录、用户、角色、权限、分组
//! - [`settings`] - 全局设置
//! - [`menu`] - 菜单分类与菜品
//! - [`inventory`] - 库存
//! - [`tables`] - 物理桌台
//! - [`sections`] - 分区
//! - [`reservations`] - 预订
//! - [`table_sessions`] - 桌台会话
//! - [`virtual_tables`] - 虚拟桌台
//! - [`orders`] - 订单与支付
//! - [`analytics`] - 报表

pub mod health;
pub mod settings;
pub mod users;

// Catalog
pub mod inventory;
pub mod menu;

// Tables
pub mod reservations;
pub mod sections;
pub mod table_sessions;
pub mod tables;
pub mod virtual_tables;

// Orders
pub mod analytics;
pub mod orders;

// Re-export common types for handlers
pub use crate::utils::{AppResult, ValidatedJson};
