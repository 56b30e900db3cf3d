//! Payment Log Repository (append-only)

use super::{RepoResult, to_json};
use shared::models::{MethodTotal, PaymentLog, PaymentMethodAmount, WaiterTips};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

const COLUMNS: &str =
    "id, table_id, orders, total, tip, grand_total, payment_methods, waiter_id, is_partial, timestamp";

/// Entry to append
#[derive(Debug, Clone)]
pub struct NewPaymentLog {
    pub table_id: i64,
    pub orders: Vec<i64>,
    pub total: f64,
    pub tip: f64,
    pub grand_total: f64,
    pub payment_methods: Vec<PaymentMethodAmount>,
    pub waiter_id: Option<i64>,
    pub is_partial: bool,
}

pub async fn append(db: impl SqliteExecutor<'_>, entry: &NewPaymentLog) -> RepoResult<PaymentLog> {
    let log = sqlx::query_as::<_, PaymentLog>(&format!(
        "INSERT INTO payment_log (id, table_id, orders, total, tip, grand_total, payment_methods, \
         waiter_id, is_partial, timestamp) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(entry.table_id)
    .bind(to_json(&entry.orders)?)
    .bind(entry.total)
    .bind(entry.tip)
    .bind(entry.grand_total)
    .bind(to_json(&entry.payment_methods)?)
    .bind(entry.waiter_id)
    .bind(entry.is_partial)
    .bind(now_millis())
    .fetch_one(db)
    .await?;
    Ok(log)
}

pub async fn find_between(
    db: impl SqliteExecutor<'_>,
    from: i64,
    to: i64,
) -> RepoResult<Vec<PaymentLog>> {
    let logs = sqlx::query_as::<_, PaymentLog>(&format!(
        "SELECT {COLUMNS} FROM payment_log WHERE timestamp BETWEEN ? AND ? ORDER BY timestamp"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(logs)
}

/// Sum of amounts per payment method within `[from, to]`
pub async fn totals_by_method(
    db: impl SqliteExecutor<'_>,
    from: i64,
    to: i64,
) -> RepoResult<Vec<MethodTotal>> {
    let totals = sqlx::query_as::<_, MethodTotal>(
        "SELECT json_extract(m.value, '$.method') AS method, \
                ROUND(SUM(json_extract(m.value, '$.amount')), 2) AS amount \
         FROM payment_log p, json_each(p.payment_methods) m \
         WHERE p.timestamp BETWEEN ? AND ? \
         GROUP BY method ORDER BY amount DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(totals)
}

/// Tips per waiter within `[from, to]`
pub async fn tips_by_waiter(
    db: impl SqliteExecutor<'_>,
    from: i64,
    to: i64,
) -> RepoResult<Vec<WaiterTips>> {
    let tips = sqlx::query_as::<_, WaiterTips>(
        "SELECT p.waiter_id, COALESCE(u.alias, u.username) AS waiter_name, \
                COUNT(*) AS payment_count, ROUND(SUM(p.tip), 2) AS total_tips \
         FROM payment_log p LEFT JOIN user u ON u.id = p.waiter_id \
         WHERE p.timestamp BETWEEN ? AND ? AND p.waiter_id IS NOT NULL \
         GROUP BY p.waiter_id ORDER BY total_tips DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(tips)
}
