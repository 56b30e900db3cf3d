//! Session Service - open, mark ready, close

use std::sync::Arc;

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::PosEvent;
use shared::models::{
    DiningTable, SessionOpen, SessionWithOrders, TableSession, TableStatus, VirtualTable,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::{get_table, get_virtual_table};
use crate::db::repository::table_session::{self, NewSession};
use crate::db::repository::{RepoError, dining_table, order, virtual_table};
use crate::services::{EventPublisher, emit};

/// What a close released
#[derive(Debug)]
pub(super) struct Closed {
    pub session: TableSession,
    pub table: Option<DiningTable>,
    pub virtual_table: Option<VirtualTable>,
}

#[derive(Clone, Debug)]
pub struct SessionService {
    pool: SqlitePool,
    events: Arc<dyn EventPublisher>,
}

impl SessionService {
    pub fn new(pool: SqlitePool, events: Arc<dyn EventPublisher>) -> Self {
        Self { pool, events }
    }

    /// Open a session on a physical table and occupy it
    pub async fn open(&self, data: SessionOpen, waiter_id: Option<i64>) -> AppResult<TableSession> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        get_table(&mut tx, data.table_id).await?;
        ensure_no_current_session(&mut tx, data.table_id).await?;

        let session = table_session::create(
            &mut *tx,
            NewSession {
                table_id: data.table_id,
                is_virtual: false,
                waiter_id: data.waiter_id.or(waiter_id),
                number_of_guests: data.number_of_guests,
                comment: data.comment.unwrap_or_default(),
            },
        )
        .await?;
        let table = dining_table::update_status(&mut *tx, data.table_id, TableStatus::Occupied).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            session_id = session.id,
            table_id = session.table_id,
            guests = session.number_of_guests,
            "Table session opened"
        );
        emit(&*self.events, PosEvent::TableStatusUpdated, &table);
        emit(&*self.events, PosEvent::SessionOpened, &session);
        Ok(session)
    }

    /// `open → ready_for_payment`
    pub async fn mark_ready(&self, id: i64) -> AppResult<TableSession> {
        if let Some(session) = table_session::mark_ready(&self.pool, id).await? {
            tracing::info!(session_id = id, "Table session ready for payment");
            return Ok(session);
        }
        match table_session::find_by_id(&self.pool, id).await? {
            None => Err(session_not_found(id)),
            Some(_) => Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "Only open sessions can be marked ready for payment",
            )),
        }
    }

    /// Close a session; rejected while its table has unpaid orders
    pub async fn close(&self, id: i64) -> AppResult<TableSession> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let closed = close_in(&mut tx, id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        publish_closed(&*self.events, &closed);
        Ok(closed.session)
    }

    /// Close the current (not yet closed) session of a table
    pub async fn close_by_table(&self, table_id: i64) -> AppResult<TableSession> {
        let session = table_session::find_current_for_table(&self.pool, table_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::SessionNotFound,
                    format!("No active session for table {table_id}"),
                )
            })?;
        self.close(session.id).await
    }

    pub async fn list_open(&self) -> AppResult<Vec<TableSession>> {
        Ok(table_session::find_open(&self.pool).await?)
    }

    /// Session plus the orders placed on its table since it opened
    pub async fn get_with_orders(&self, id: i64) -> AppResult<SessionWithOrders> {
        let session = table_session::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| session_not_found(id))?;
        let orders =
            order::find_for_table_since(&self.pool, session.table_id, session.created_at).await?;
        Ok(SessionWithOrders { session, orders })
    }
}

pub(super) fn session_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::SessionNotFound, format!("Session {id} not found"))
}

/// Rejects a table that already has a non-closed session
pub(super) async fn ensure_no_current_session(
    conn: &mut SqliteConnection,
    table_id: i64,
) -> AppResult<()> {
    if let Some(existing) = table_session::find_current_for_table(&mut *conn, table_id).await? {
        return Err(AppError::with_message(
            ErrorCode::SessionAlreadyOpen,
            format!("Table {table_id} already has session {}", existing.id),
        ));
    }
    Ok(())
}

/// Close the session and release whatever table it occupied
pub(super) async fn close_in(conn: &mut SqliteConnection, id: i64) -> AppResult<Closed> {
    let session = table_session::close(&mut *conn, id).await?;

    let mut closed = Closed {
        session,
        table: None,
        virtual_table: None,
    };
    if closed.session.is_virtual {
        get_virtual_table(&mut *conn, closed.session.table_id).await?;
        closed.virtual_table =
            Some(virtual_table::clear_session(&mut *conn, closed.session.table_id).await?);
    } else {
        match dining_table::update_status(&mut *conn, closed.session.table_id, TableStatus::Available)
            .await
        {
            Ok(table) => closed.table = Some(table),
            // table deleted while the session was open
            Err(RepoError::NotFound(_)) => {
                tracing::warn!(table_id = closed.session.table_id, "Closed session of a missing table")
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(
        session_id = id,
        table_id = closed.session.table_id,
        is_virtual = closed.session.is_virtual,
        "Table session closed"
    );
    Ok(closed)
}

pub(super) fn publish_closed(events: &dyn EventPublisher, closed: &Closed) {
    emit(events, PosEvent::SessionClosed, &closed.session);
    if let Some(table) = &closed.table {
        emit(events, PosEvent::TableStatusUpdated, table);
    }
    if let Some(vt) = &closed.virtual_table {
        emit(
            events,
            PosEvent::VirtualTableUpdated,
            &json!({ "action": "session_closed", "virtualTable": vt }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::services::events::testing::RecordingPublisher;
    use shared::models::{DiningTableCreate, SessionStatus};

    async fn setup() -> (SessionService, Arc<RecordingPublisher>, SqlitePool, DiningTable) {
        let pool = test_pool().await;
        let events = Arc::new(RecordingPublisher::default());
        let table = dining_table::create(
            &pool,
            &DiningTableCreate {
                number: "T1".into(),
                capacity: None,
                status: None,
                section_id: None,
            },
        )
        .await
        .unwrap();
        (SessionService::new(pool.clone(), events.clone()), events, pool, table)
    }

    fn open_request(table_id: i64) -> SessionOpen {
        SessionOpen {
            table_id,
            waiter_id: None,
            number_of_guests: 3,
            comment: Some("cumpleaños".into()),
        }
    }

    #[tokio::test]
    async fn open_occupies_the_table() {
        let (service, events, pool, table) = setup().await;

        let session = service.open(open_request(table.id), Some(7)).await.unwrap();
        assert_eq!(session.status, SessionStatus::Open);
        assert_eq!(session.waiter_id, Some(7));
        assert_eq!(session.comment, "cumpleaños");

        let table = dining_table::find_by_id(&pool, table.id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert_eq!(
            events.events(),
            vec![PosEvent::TableStatusUpdated, PosEvent::SessionOpened]
        );
    }

    #[tokio::test]
    async fn second_session_is_rejected() {
        let (service, _, _, table) = setup().await;
        service.open(open_request(table.id), None).await.unwrap();

        let err = service.open(open_request(table.id), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionAlreadyOpen);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);

        let err = service.open(open_request(404), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn ready_session_still_blocks_a_new_one() {
        let (service, _, _, table) = setup().await;
        let session = service.open(open_request(table.id), None).await.unwrap();
        let ready = service.mark_ready(session.id).await.unwrap();
        assert_eq!(ready.status, SessionStatus::ReadyForPayment);

        let err = service.open(open_request(table.id), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionAlreadyOpen);

        let err = service.mark_ready(session.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn close_frees_the_table() {
        let (service, events, pool, table) = setup().await;
        let session = service.open(open_request(table.id), None).await.unwrap();

        let closed = service.close_by_table(table.id).await.unwrap();
        assert_eq!(closed.id, session.id);
        assert_eq!(closed.status, SessionStatus::Closed);
        assert!(closed.closed_at.is_some());

        let table = dining_table::find_by_id(&pool, table.id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available);
        assert!(events.events().ends_with(&[PosEvent::SessionClosed, PosEvent::TableStatusUpdated]));

        let err = service.close(session.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionClosed);
        assert!(service.list_open().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn with_orders_of_a_fresh_session_is_empty() {
        let (service, _, _, table) = setup().await;
        let session = service.open(open_request(table.id), None).await.unwrap();

        let view = service.get_with_orders(session.id).await.unwrap();
        assert_eq!(view.session.id, session.id);
        assert!(view.orders.is_empty());

        let err = service.get_with_orders(1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);
    }
}
