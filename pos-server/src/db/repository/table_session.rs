//! Table Session Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{SessionStatus, TableSession};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqliteExecutor};

const COLUMNS: &str =
    "id, table_id, is_virtual, waiter_id, number_of_guests, comment, status, created_at, closed_at";

/// Row to insert
#[derive(Debug, Clone)]
pub struct NewSession {
    pub table_id: i64,
    pub is_virtual: bool,
    pub waiter_id: Option<i64>,
    pub number_of_guests: i32,
    pub comment: String,
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_session WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(session)
}

pub async fn find_open(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<TableSession>> {
    let sessions = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_session WHERE status = 'open' ORDER BY created_at"
    ))
    .fetch_all(db)
    .await?;
    Ok(sessions)
}

/// The table's open session, if any
pub async fn find_open_for_table(
    db: impl SqliteExecutor<'_>,
    table_id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_session WHERE table_id = ? AND status = 'open' LIMIT 1"
    ))
    .bind(table_id)
    .fetch_optional(db)
    .await?;
    Ok(session)
}

/// The table's most recent session that is not closed yet
pub async fn find_current_for_table(
    db: impl SqliteExecutor<'_>,
    table_id: i64,
) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "SELECT {COLUMNS} FROM table_session WHERE table_id = ? AND status != 'closed' \
         ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(table_id)
    .fetch_optional(db)
    .await?;
    Ok(session)
}

/// Insert an open session; a second open session for the table violates the
/// partial unique index
pub async fn create(db: impl SqliteExecutor<'_>, data: NewSession) -> RepoResult<TableSession> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "INSERT INTO table_session (id, table_id, is_virtual, waiter_id, number_of_guests, comment, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, 'open', ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(data.table_id)
    .bind(data.is_virtual)
    .bind(data.waiter_id)
    .bind(data.number_of_guests)
    .bind(&data.comment)
    .bind(now_millis())
    .fetch_one(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::SessionAlreadyOpen,
            "There is already an open session for this table".into(),
        ),
        other => other,
    })?;
    Ok(session)
}

/// `open → ready_for_payment`
pub async fn mark_ready(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<TableSession>> {
    let session = sqlx::query_as::<_, TableSession>(&format!(
        "UPDATE table_session SET status = 'ready_for_payment' \
         WHERE id = ? AND status = 'open' RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(session)
}

/// Close the session unless its table still has unpaid orders
///
/// The unpaid check and the update are one statement.
pub async fn close(conn: &mut SqliteConnection, id: i64) -> RepoResult<TableSession> {
    let closed = sqlx::query_as::<_, TableSession>(&format!(
        "UPDATE table_session SET status = 'closed', closed_at = ?1 \
         WHERE id = ?2 AND status != 'closed' \
         AND NOT EXISTS (SELECT 1 FROM orders o WHERE o.table_id = table_session.table_id AND o.paid = 0) \
         RETURNING {COLUMNS}"
    ))
    .bind(now_millis())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(session) = closed {
        return Ok(session);
    }

    // explain the refusal
    match find_by_id(&mut *conn, id).await? {
        None => Err(RepoError::Business(
            ErrorCode::SessionNotFound,
            format!("Session {id} not found"),
        )),
        Some(s) if s.status == SessionStatus::Closed => Err(RepoError::Business(
            ErrorCode::SessionClosed,
            "Session is already closed".into(),
        )),
        Some(_) => Err(RepoError::Business(
            ErrorCode::UnpaidOrders,
            "Cannot close session with unpaid orders".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn session(table_id: i64) -> NewSession {
        NewSession {
            table_id,
            is_virtual: false,
            waiter_id: None,
            number_of_guests: 2,
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn one_open_session_per_table() {
        let pool = test_pool().await;
        let first = create(&pool, session(1)).await.unwrap();
        assert_eq!(first.status, SessionStatus::Open);

        let err = create(&pool, session(1)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SessionAlreadyOpen, _)));

        // other tables are unaffected
        create(&pool, session(2)).await.unwrap();
        assert_eq!(find_open(&pool).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn close_is_blocked_by_unpaid_orders() {
        let pool = test_pool().await;
        let s = create(&pool, session(1)).await.unwrap();
        sqlx::query(
            "INSERT INTO orders (id, table_id, session_id, items, status, total, created_at, updated_at) \
             VALUES (1, 1, ?, '[]', 'ready', 10, 0, 0)",
        )
        .bind(s.id)
        .execute(&pool)
        .await
        .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        let err = close(&mut conn, s.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::UnpaidOrders, _)));

        sqlx::query("UPDATE orders SET paid = 1 WHERE id = 1")
            .execute(&mut *conn)
            .await
            .unwrap();
        let closed = close(&mut conn, s.id).await.unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
        assert!(closed.closed_at.is_some());

        let err = close(&mut conn, s.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SessionClosed, _)));
        let err = close(&mut conn, 404).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::SessionNotFound, _)));
    }

    #[tokio::test]
    async fn mark_ready_only_from_open() {
        let pool = test_pool().await;
        let s = create(&pool, session(1)).await.unwrap();
        let ready = mark_ready(&pool, s.id).await.unwrap().unwrap();
        assert_eq!(ready.status, SessionStatus::ReadyForPayment);
        assert!(mark_ready(&pool, s.id).await.unwrap().is_none());

        // still the table's current session
        let current = find_current_for_table(&pool, 1).await.unwrap().unwrap();
        assert_eq!(current.id, s.id);
        assert!(find_open_for_table(&pool, 1).await.unwrap().is_none());
    }
}
