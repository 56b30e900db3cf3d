//! Table Service - physical tables, sections and reservations

use std::sync::Arc;

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::PosEvent;
use shared::models::{
    DiningTable, DiningTableCreate, DiningTableUpdate, Reservation, ReservationCreate,
    ReservationStatus, Section, SectionWithTables, TableStatus,
};
use sqlx::SqlitePool;

use super::get_table;
use crate::db::repository::{RepoError, dining_table, reservation, section, table_session};
use crate::services::{EventPublisher, emit};

#[derive(Clone, Debug)]
pub struct TableService {
    pool: SqlitePool,
    events: Arc<dyn EventPublisher>,
}

impl TableService {
    pub fn new(pool: SqlitePool, events: Arc<dyn EventPublisher>) -> Self {
        Self { pool, events }
    }

    async fn connection(&self) -> AppResult<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        Ok(self.pool.acquire().await.map_err(RepoError::from)?)
    }

    // =========================================================================
    // Tables
    // =========================================================================

    pub async fn list(&self) -> AppResult<Vec<DiningTable>> {
        Ok(dining_table::find_all(&self.pool).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<DiningTable> {
        get_table(&mut *self.connection().await?, id).await
    }

    pub async fn create(&self, data: DiningTableCreate) -> AppResult<DiningTable> {
        if let Some(section_id) = data.section_id {
            self.get_section_row(section_id).await?;
        }
        let table = dining_table::create(&self.pool, &data).await?;
        tracing::info!(table_id = table.id, number = %table.number, "Table created");
        emit(&*self.events, PosEvent::TableCreated, &table);
        Ok(table)
    }

    pub async fn update(&self, id: i64, data: DiningTableUpdate) -> AppResult<DiningTable> {
        if let Some(section_id) = data.section_id {
            self.get_section_row(section_id).await?;
        }
        let table = dining_table::update(&self.pool, id, &data)
            .await
            .map_err(table_not_found)?;
        emit(&*self.events, PosEvent::TableUpdated, &table);
        Ok(table)
    }

    pub async fn update_status(&self, id: i64, status: TableStatus) -> AppResult<DiningTable> {
        let table = dining_table::update_status(&self.pool, id, status)
            .await
            .map_err(table_not_found)?;
        tracing::info!(table_id = id, status = status.as_str(), "Table status updated");
        emit(&*self.events, PosEvent::TableStatusUpdated, &table);
        Ok(table)
    }

    /// Rejected while the table is part of a virtual table or has a session
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        let table = get_table(&mut conn, id).await?;
        if let Some(vt) = table.virtual_table_id {
            return Err(AppError::with_message(
                ErrorCode::PhysicalTableInUse,
                format!("Table {} belongs to virtual table {vt}", table.number),
            ));
        }
        if table_session::find_current_for_table(&mut *conn, id).await?.is_some() {
            return Err(AppError::with_message(
                ErrorCode::TableNotAvailable,
                format!("Table {} has an active session", table.number),
            ));
        }

        dining_table::delete(&mut *conn, id).await?;
        tracing::info!(table_id = id, "Table deleted");
        emit(&*self.events, PosEvent::TableDeleted, &json!({ "id": id }));
        Ok(())
    }

    // =========================================================================
    // Sections
    // =========================================================================

    pub async fn list_sections(&self) -> AppResult<Vec<SectionWithTables>> {
        let sections = section::find_all(&self.pool).await?;
        let mut result = Vec::with_capacity(sections.len());
        for s in sections {
            let tables = dining_table::find_by_section(&self.pool, s.id).await?;
            result.push(SectionWithTables { section: s, tables });
        }
        Ok(result)
    }

    pub async fn get_section(&self, id: i64) -> AppResult<SectionWithTables> {
        let s = self.get_section_row(id).await?;
        let tables = dining_table::find_by_section(&self.pool, id).await?;
        Ok(SectionWithTables { section: s, tables })
    }

    pub async fn create_section(&self, name: &str) -> AppResult<Section> {
        let created = section::create(&self.pool, name).await?;
        tracing::info!(section_id = created.id, name = %created.name, "Section created");
        Ok(created)
    }

    pub async fn rename_section(&self, id: i64, name: &str) -> AppResult<Section> {
        section::rename(&self.pool, id, name)
            .await
            .map_err(|e| section_not_found(e, id))
    }

    /// Tables of the section stay, without a section
    pub async fn delete_section(&self, id: i64) -> AppResult<()> {
        section::delete(&self.pool, id)
            .await
            .map_err(|e| section_not_found(e, id))?;
        tracing::info!(section_id = id, "Section deleted");
        Ok(())
    }

    pub async fn create_table_in_section(
        &self,
        section_id: i64,
        mut data: DiningTableCreate,
    ) -> AppResult<DiningTable> {
        data.section_id = Some(section_id);
        self.create(data).await
    }

    async fn get_section_row(&self, id: i64) -> AppResult<Section> {
        section::find_by_id(&self.pool, id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::SectionNotFound, format!("Section {id} not found"))
        })
    }

    // =========================================================================
    // Reservations
    // =========================================================================

    pub async fn list_reservations(&self) -> AppResult<Vec<Reservation>> {
        Ok(reservation::find_all(&self.pool).await?)
    }

    /// Reserve an available table
    pub async fn create_reservation(&self, data: ReservationCreate) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let table = get_table(&mut tx, data.table_id).await?;
        if table.status != TableStatus::Available {
            return Err(AppError::with_message(
                ErrorCode::TableNotAvailable,
                format!("Table {} is {}", table.number, table.status.as_str()),
            ));
        }
        let created = reservation::create(&mut *tx, &data).await?;
        let table = dining_table::update_status(&mut *tx, table.id, TableStatus::Reserved).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(reservation_id = created.id, table_id = table.id, "Reservation created");
        emit(&*self.events, PosEvent::TableStatusUpdated, &table);
        Ok(created)
    }

    /// Completing a reservation frees a table that is still only reserved
    pub async fn update_reservation_status(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let updated = reservation::update_status(&mut *tx, id, status)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(msg) => AppError::with_message(ErrorCode::ReservationNotFound, msg),
                other => other.into(),
            })?;

        let mut freed = None;
        if status == ReservationStatus::Completed
            && let Some(table) = dining_table::find_by_id(&mut *tx, updated.table_id).await?
            && table.status == TableStatus::Reserved
        {
            freed = Some(dining_table::update_status(&mut *tx, table.id, TableStatus::Available).await?);
        }
        tx.commit().await.map_err(RepoError::from)?;

        if let Some(table) = &freed {
            emit(&*self.events, PosEvent::TableStatusUpdated, table);
        }
        Ok(updated)
    }
}

fn table_not_found(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::TableNotFound, msg),
        other => other.into(),
    }
}

fn section_not_found(e: RepoError, id: i64) -> AppError {
    match e {
        RepoError::NotFound(_) => {
            AppError::with_message(ErrorCode::SectionNotFound, format!("Section {id} not found"))
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::db::repository::table_session::NewSession;
    use crate::services::events::testing::RecordingPublisher;

    async fn service() -> (TableService, Arc<RecordingPublisher>) {
        let pool = test_pool().await;
        let events = Arc::new(RecordingPublisher::default());
        (TableService::new(pool, events.clone()), events)
    }

    fn table(number: &str) -> DiningTableCreate {
        DiningTableCreate {
            number: number.into(),
            capacity: Some(2),
            status: None,
            section_id: None,
        }
    }

    #[tokio::test]
    async fn table_crud_publishes_events() {
        let (service, events) = service().await;
        let created = service.create(table("T1")).await.unwrap();
        assert_eq!(created.status, TableStatus::Available);

        let updated = service
            .update(
                created.id,
                DiningTableUpdate {
                    capacity: Some(6),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.capacity, 6);
        assert_eq!(updated.number, "T1");

        service.delete(created.id).await.unwrap();
        let err = service.get(created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        assert_eq!(
            events.events(),
            vec![PosEvent::TableCreated, PosEvent::TableUpdated, PosEvent::TableDeleted]
        );
    }

    #[tokio::test]
    async fn table_with_session_cannot_be_deleted() {
        let (service, _) = service().await;
        let created = service.create(table("T1")).await.unwrap();
        table_session::create(
            &service.pool,
            NewSession {
                table_id: created.id,
                is_virtual: false,
                waiter_id: None,
                number_of_guests: 2,
                comment: String::new(),
            },
        )
        .await
        .unwrap();

        let err = service.delete(created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotAvailable);
    }

    #[tokio::test]
    async fn sections_group_tables() {
        let (service, _) = service().await;
        let terraza = service.create_section("Terraza").await.unwrap();
        service.create_table_in_section(terraza.id, table("T1")).await.unwrap();
        service.create_table_in_section(terraza.id, table("T2")).await.unwrap();
        service.create(table("B1")).await.unwrap();

        let view = service.get_section(terraza.id).await.unwrap();
        assert_eq!(view.tables.len(), 2);

        let err = service.create_table_in_section(404, table("X")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SectionNotFound);

        service.delete_section(terraza.id).await.unwrap();
        assert!(service.list().await.unwrap().iter().all(|t| t.section_id.is_none()));
    }

    #[tokio::test]
    async fn reservation_holds_the_table_until_completed() {
        let (service, _) = service().await;
        let t = service.create(table("T1")).await.unwrap();

        let booking = service
            .create_reservation(ReservationCreate {
                table_id: t.id,
                customer_name: " Lucía ".into(),
                reservation_time: 1_700_000_000_000,
            })
            .await
            .unwrap();
        assert_eq!(booking.customer_name, "Lucía");
        assert_eq!(service.get(t.id).await.unwrap().status, TableStatus::Reserved);

        let err = service
            .create_reservation(ReservationCreate {
                table_id: t.id,
                customer_name: "Otro".into(),
                reservation_time: 1_700_000_000_000,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotAvailable);

        service
            .update_reservation_status(booking.id, ReservationStatus::Completed)
            .await
            .unwrap();
        assert_eq!(service.get(t.id).await.unwrap().status, TableStatus::Available);

        let err = service
            .update_reservation_status(404, ReservationStatus::Seated)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationNotFound);
    }
}
