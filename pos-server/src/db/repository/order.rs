//! Order Repository
//!
//! Order lines live in the `items` JSON column; area filters look inside it
//! with `json_each`.

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{Area, Order, OrderQuery};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, table_id, session_id, waiter_id, items, status, total, tip, amount_paid, \
    paid, payment_method, source, created_at, updated_at";

const HAS_AREA: &str = "EXISTS (SELECT 1 FROM json_each(orders.items) j \
    WHERE json_extract(j.value, '$.area') = ?)";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::OrderNotFound, format!("Order {id} not found"))
}

pub async fn find_all(db: impl SqliteExecutor<'_>, query: &OrderQuery) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders \
         WHERE (?1 IS NULL OR status = ?1) \
         AND (?2 IS NULL OR table_id = ?2) \
         AND (?3 IS NULL OR paid = ?3) \
         AND (?4 IS NULL OR created_at >= ?4) \
         AND (?5 IS NULL OR created_at <= ?5) \
         AND (?6 IS NULL OR EXISTS (SELECT 1 FROM json_each(orders.items) j \
              WHERE json_extract(j.value, '$.area') = ?6)) \
         ORDER BY created_at DESC"
    ))
    .bind(query.status)
    .bind(query.table_id)
    .bind(query.paid)
    .bind(query.from)
    .bind(query.to)
    .bind(query.area.map(|a| a.as_str()))
    .fetch_all(db)
    .await?;
    Ok(orders)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(order)
}

pub async fn get(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Order> {
    find_by_id(db, id).await?.ok_or_else(|| not_found(id))
}

pub async fn find_unpaid_for_table(
    db: impl SqliteExecutor<'_>,
    table_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE table_id = ? AND paid = 0 ORDER BY created_at"
    ))
    .bind(table_id)
    .fetch_all(db)
    .await?;
    Ok(orders)
}

/// Unpaid orders whose status allows payment
pub async fn find_payable_for_table(
    db: impl SqliteExecutor<'_>,
    table_id: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE table_id = ? AND paid = 0 \
         AND status IN ('ready', 'sent to cashier', 'delivered') ORDER BY created_at"
    ))
    .bind(table_id)
    .fetch_all(db)
    .await?;
    Ok(orders)
}

/// Orders placed on a table since `since`
pub async fn find_for_table_since(
    db: impl SqliteExecutor<'_>,
    table_id: i64,
    since: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE table_id = ? AND created_at >= ? ORDER BY created_at"
    ))
    .bind(table_id)
    .bind(since)
    .fetch_all(db)
    .await?;
    Ok(orders)
}

/// Work queue of an area: orders with lines for it that are neither ready nor paid
pub async fn find_for_area(db: impl SqliteExecutor<'_>, area: Area) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE paid = 0 AND status NOT IN ('ready', 'paid') \
         AND {HAS_AREA} ORDER BY created_at"
    ))
    .bind(area.as_str())
    .fetch_all(db)
    .await?;
    Ok(orders)
}

/// Paid orders created within `[from, to]`
pub async fn find_paid_between(
    db: impl SqliteExecutor<'_>,
    from: i64,
    to: i64,
) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE paid = 1 AND created_at BETWEEN ? AND ? \
         ORDER BY created_at"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(orders)
}

pub async fn insert(db: impl SqliteExecutor<'_>, order: &Order) -> RepoResult<Order> {
    let created = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (id, table_id, session_id, waiter_id, items, status, total, tip, amount_paid, \
         paid, payment_method, source, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(order.id)
    .bind(order.table_id)
    .bind(order.session_id)
    .bind(order.waiter_id)
    .bind(to_json(&order.items)?)
    .bind(order.status)
    .bind(order.total)
    .bind(order.tip)
    .bind(order.amount_paid)
    .bind(order.paid)
    .bind(&order.payment_method)
    .bind(order.source)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(db)
    .await?;
    Ok(created)
}

/// Persist the mutable fields of an order that was unpaid when loaded
///
/// Fails with `OrderAlreadyPaid` if another writer settled it in between.
pub async fn save_unpaid(db: impl SqliteExecutor<'_>, order: &Order) -> RepoResult<Order> {
    let saved = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET items = ?, status = ?, total = ?, tip = ?, amount_paid = ?, paid = ?, \
         payment_method = ?, updated_at = ? WHERE id = ? AND paid = 0 RETURNING {COLUMNS}"
    ))
    .bind(to_json(&order.items)?)
    .bind(order.status)
    .bind(order.total)
    .bind(order.tip)
    .bind(order.amount_paid)
    .bind(order.paid)
    .bind(&order.payment_method)
    .bind(order.updated_at)
    .bind(order.id)
    .fetch_optional(db)
    .await?;
    saved.ok_or_else(|| {
        RepoError::Business(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} is already paid", order.id),
        )
    })
}
