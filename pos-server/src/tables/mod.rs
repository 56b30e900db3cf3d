//! 桌台模块
//!
//! - [`TableService`] - 物理桌台、分区、预订
//! - [`SessionService`] - 桌台会话 (开台 / 待结账 / 关台)
//! - [`VirtualTableService`] - 虚拟桌台 (独立或拼桌)
//!
//! 一张桌台同一时间最多一个 `open` 会话；关台要求该桌没有未付订单。

mod dining;
mod sessions;
mod virtual_tables;

pub use dining::TableService;
pub use sessions::SessionService;
pub use virtual_tables::VirtualTableService;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DiningTable, VirtualTable};
use sqlx::SqliteConnection;

use crate::db::repository::{dining_table, virtual_table};

pub(crate) async fn get_table(conn: &mut SqliteConnection, id: i64) -> AppResult<DiningTable> {
    dining_table::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found")))
}

pub(crate) async fn get_virtual_table(
    conn: &mut SqliteConnection,
    id: i64,
) -> AppResult<VirtualTable> {
    virtual_table::find_by_id(&mut *conn, id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::VirtualTableNotFound,
            format!("Virtual table {id} not found"),
        )
    })
}
