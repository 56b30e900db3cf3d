//! Table Session Model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::order::Order;

/// `open → ready_for_payment → closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum SessionStatus {
    Open,
    ReadyForPayment,
    Closed,
}

/// One guest visit at a table (physical or virtual)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TableSession {
    pub id: i64,
    pub table_id: i64,
    pub is_virtual: bool,
    pub waiter_id: Option<i64>,
    pub number_of_guests: i32,
    pub comment: String,
    pub status: SessionStatus,
    pub created_at: i64,
    pub closed_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionOpen {
    pub table_id: i64,
    /// Defaults to the authenticated user
    pub waiter_id: Option<i64>,
    #[validate(range(min = 1, max = 200))]
    pub number_of_guests: i32,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

/// Session plus the orders placed on its table since it opened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionWithOrders {
    pub session: TableSession,
    pub orders: Vec<Order>,
}
