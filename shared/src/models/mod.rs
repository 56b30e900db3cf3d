//! Data models
//!
//! Shared between pos-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids, all timestamps Unix millis.

pub mod analytics;
pub mod dining_table;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod payment;
pub mod reservation;
pub mod role;
pub mod section;
pub mod setting;
pub mod table_session;
pub mod user;
pub mod virtual_table;

// Re-exports
pub use analytics::*;
pub use dining_table::*;
pub use inventory::*;
pub use menu::*;
pub use order::*;
pub use payment::*;
pub use reservation::*;
pub use role::*;
pub use section::*;
pub use setting::*;
pub use table_session::*;
pub use user::*;
pub use virtual_table::*;
