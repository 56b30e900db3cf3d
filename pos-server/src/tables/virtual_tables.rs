//! Virtual Table Service
//!
//! Standalone tables carry their own capacity; combined tables occupy their
//! physical members, which remember the status to return to when released.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::PosEvent;
use shared::models::{
    DiningTable, GenerateVirtualTables, MAX_VIRTUAL_CAPACITY, PhysicalTableRef, TableSession,
    VirtualSessionStart, VirtualTable, VirtualTableCreate, VirtualTableMode, VirtualTableStatus,
};
use shared::util::snowflake_id;
use sqlx::{SqliteConnection, SqlitePool};

use super::sessions::{close_in, ensure_no_current_session, publish_closed};
use super::{get_table, get_virtual_table};
use crate::db::repository::table_session::{self, NewSession};
use crate::db::repository::virtual_table::{self, NewVirtualTable, SessionInfo};
use crate::db::repository::{RepoError, dining_table};
use crate::services::{EventPublisher, emit};

const GENERATED_DESCRIPTION: &str = "Mesa virtual generada automáticamente";

#[derive(Clone, Debug)]
pub struct VirtualTableService {
    pool: SqlitePool,
    events: Arc<dyn EventPublisher>,
}

impl VirtualTableService {
    pub fn new(pool: SqlitePool, events: Arc<dyn EventPublisher>) -> Self {
        Self { pool, events }
    }

    async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Sqlite>> {
        Ok(self.pool.begin().await.map_err(RepoError::from)?)
    }

    fn publish(&self, action: &str, vt: &VirtualTable) {
        emit(
            &*self.events,
            PosEvent::VirtualTableUpdated,
            &json!({ "action": action, "virtualTable": vt }),
        );
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list(&self, active: Option<bool>) -> AppResult<Vec<VirtualTable>> {
        Ok(virtual_table::find_all(&self.pool, active).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<VirtualTable> {
        let mut conn = self.pool.acquire().await.map_err(RepoError::from)?;
        get_virtual_table(&mut conn, id).await
    }

    /// Physical tables that can join a combination
    pub async fn available_physical_tables(&self) -> AppResult<Vec<DiningTable>> {
        Ok(dining_table::find_combinable(&self.pool).await?)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub async fn create(
        &self,
        data: VirtualTableCreate,
        created_by: Option<i64>,
    ) -> AppResult<VirtualTable> {
        let name = data.name.trim().to_string();
        let config = data.configuration.unwrap_or_default();
        let mut row = NewVirtualTable {
            id: snowflake_id(),
            name: name.clone(),
            description: data.description.unwrap_or_default(),
            mode: data.mode,
            capacity: 0,
            physical_tables: Vec::new(),
            allow_separate_orders: config.allow_separate_orders,
            combine_billing: config.combine_billing,
            notes: config.notes,
            created_by,
        };

        let mut tx = self.begin().await?;
        if virtual_table::name_exists(&mut *tx, &name).await? {
            return Err(AppError::conflict(format!(
                "An active virtual table named '{name}' already exists"
            )));
        }

        let mut attached = Vec::new();
        match data.mode {
            VirtualTableMode::Standalone => {
                let capacity = data.capacity.unwrap_or(4);
                if !(1..=MAX_VIRTUAL_CAPACITY).contains(&capacity) {
                    return Err(AppError::validation(format!(
                        "Capacity must be between 1 and {MAX_VIRTUAL_CAPACITY}"
                    )));
                }
                row.capacity = capacity;
            }
            VirtualTableMode::Combined => {
                let unique: HashSet<i64> = data.physical_table_ids.iter().copied().collect();
                if unique.len() < 2 {
                    return Err(AppError::with_message(
                        ErrorCode::InvalidVirtualTableMode,
                        "A combined table needs at least two physical tables",
                    ));
                }
                for &table_id in &data.physical_table_ids {
                    if row.physical_tables.iter().any(|t| t.table_id == table_id) {
                        continue;
                    }
                    let (member, table) = attach(&mut tx, row.id, table_id).await?;
                    row.physical_tables.push(member);
                    attached.push(table);
                }
            }
        }

        let vt = virtual_table::create(&mut *tx, &row).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            virtual_table_id = vt.id,
            name = %vt.name,
            mode = ?vt.mode,
            capacity = vt.total_capacity,
            "Virtual table created"
        );
        for table in &attached {
            emit(&*self.events, PosEvent::TableStatusUpdated, table);
        }
        self.publish("created", &vt);
        Ok(vt)
    }

    /// Create `count` standalone tables named `"{prefix} {n}"`
    pub async fn generate(
        &self,
        data: GenerateVirtualTables,
        created_by: Option<i64>,
    ) -> AppResult<Vec<VirtualTable>> {
        let mut tx = self.begin().await?;
        let mut taken: HashSet<String> = virtual_table::find_all(&mut *tx, Some(true))
            .await?
            .into_iter()
            .map(|vt| vt.name)
            .collect();

        let mut created = Vec::with_capacity(data.count as usize);
        for i in 1..=data.count {
            let mut name = format!("{} {i}", data.name_prefix);
            let mut suffix = 1;
            while taken.contains(&name) {
                name = format!("{} {i}-{suffix}", data.name_prefix);
                suffix += 1;
            }

            let mut row = NewVirtualTable::standalone(name.clone(), data.base_capacity);
            row.description = GENERATED_DESCRIPTION.to_string();
            row.created_by = created_by;
            created.push(virtual_table::create(&mut *tx, &row).await?);
            taken.insert(name);
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(count = created.len(), "Virtual tables generated");
        for vt in &created {
            self.publish("created", vt);
        }
        Ok(created)
    }

    /// Add an available physical table to a combined table
    pub async fn add_physical_table(&self, id: i64, table_id: i64) -> AppResult<VirtualTable> {
        let mut tx = self.begin().await?;
        let vt = get_active(&mut tx, id).await?;
        if vt.mode != VirtualTableMode::Combined {
            return Err(AppError::with_message(
                ErrorCode::InvalidVirtualTableMode,
                "Physical tables can only be added to combined virtual tables",
            ));
        }
        if vt.contains_table(table_id) {
            return Err(AppError::conflict(format!(
                "Table {table_id} is already part of this virtual table"
            )));
        }

        let (member, table) = attach(&mut tx, vt.id, table_id).await?;
        let mut members = vt.physical_tables;
        members.push(member);
        let vt = virtual_table::set_physical_tables(&mut *tx, id, &members).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(virtual_table_id = id, table_id, "Physical table added");
        emit(&*self.events, PosEvent::TableStatusUpdated, &table);
        self.publish("table_added", &vt);
        Ok(vt)
    }

    /// Release a member; the last one cannot leave
    pub async fn remove_physical_table(&self, id: i64, table_id: i64) -> AppResult<VirtualTable> {
        let mut tx = self.begin().await?;
        let vt = get_virtual_table(&mut tx, id).await?;
        let Some(member) = vt.physical_tables.iter().find(|t| t.table_id == table_id).cloned()
        else {
            return Err(AppError::with_message(
                ErrorCode::TableNotFound,
                format!("Table {table_id} is not part of virtual table {id}"),
            ));
        };
        if vt.physical_tables.len() <= 1 {
            return Err(AppError::new(ErrorCode::LastPhysicalTable));
        }

        dining_table::detach_from_virtual(&mut *tx, table_id, member.original_status).await?;
        let members: Vec<PhysicalTableRef> = vt
            .physical_tables
            .into_iter()
            .filter(|t| t.table_id != table_id)
            .collect();
        let vt = virtual_table::set_physical_tables(&mut *tx, id, &members).await?;
        let table = dining_table::find_by_id(&mut *tx, table_id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(virtual_table_id = id, table_id, "Physical table removed");
        if let Some(table) = &table {
            emit(&*self.events, PosEvent::TableStatusUpdated, table);
        }
        self.publish("table_removed", &vt);
        Ok(vt)
    }

    /// Open a session on the virtual table and occupy it
    pub async fn start_session(
        &self,
        id: i64,
        data: VirtualSessionStart,
        waiter_id: Option<i64>,
    ) -> AppResult<TableSession> {
        let mut tx = self.begin().await?;
        let vt = get_active(&mut tx, id).await?;
        if vt.status == VirtualTableStatus::Occupied {
            return Err(occupied(&vt));
        }
        ensure_no_current_session(&mut tx, id).await?;

        let comment = match data.comment.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => format!("Mesa Virtual: {} - {c}", vt.name),
            _ => format!("Mesa Virtual: {}", vt.name),
        };
        let session = table_session::create(
            &mut *tx,
            NewSession {
                table_id: id,
                is_virtual: true,
                waiter_id: data.waiter_id.or(waiter_id),
                number_of_guests: data.number_of_guests,
                comment,
            },
        )
        .await?;
        let info = SessionInfo {
            session_id: session.id,
            waiter_id: session.waiter_id,
            guests: session.number_of_guests,
        };
        let vt = virtual_table::start_session(&mut *tx, id, info)
            .await?
            .ok_or_else(|| occupied(&vt))?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(virtual_table_id = id, session_id = session.id, "Virtual table session started");
        emit(&*self.events, PosEvent::SessionOpened, &session);
        self.publish("session_started", &vt);
        Ok(session)
    }

    /// Close the current session; rejected with unpaid orders
    pub async fn close_session(&self, id: i64) -> AppResult<TableSession> {
        let mut tx = self.begin().await?;
        let vt = get_virtual_table(&mut tx, id).await?;
        let session_id = vt.current_session_id.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::SessionNotFound,
                format!("Virtual table {} has no active session", vt.name),
            )
        })?;
        let closed = close_in(&mut tx, session_id).await?;
        tx.commit().await.map_err(RepoError::from)?;

        publish_closed(&*self.events, &closed);
        Ok(closed.session)
    }

    /// Deactivate and return every physical member to its original status
    pub async fn deactivate(&self, id: i64) -> AppResult<VirtualTable> {
        let mut tx = self.begin().await?;
        let current = get_virtual_table(&mut tx, id).await?;
        let vt = virtual_table::deactivate(&mut *tx, id)
            .await?
            .ok_or_else(|| occupied(&current))?;

        let mut released = Vec::with_capacity(current.physical_tables.len());
        for member in &current.physical_tables {
            dining_table::detach_from_virtual(&mut *tx, member.table_id, member.original_status)
                .await?;
            if let Some(table) = dining_table::find_by_id(&mut *tx, member.table_id).await? {
                released.push(table);
            }
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(virtual_table_id = id, released = released.len(), "Virtual table deactivated");
        for table in &released {
            emit(&*self.events, PosEvent::TableStatusUpdated, table);
        }
        self.publish("deactivated", &vt);
        Ok(vt)
    }
}

fn occupied(vt: &VirtualTable) -> AppError {
    AppError::with_message(
        ErrorCode::VirtualTableOccupied,
        format!("Virtual table {} is occupied", vt.name),
    )
}

async fn get_active(conn: &mut SqliteConnection, id: i64) -> AppResult<VirtualTable> {
    let vt = get_virtual_table(&mut *conn, id).await?;
    if !vt.is_active {
        return Err(AppError::with_message(
            ErrorCode::InvalidRequest,
            format!("Virtual table {} is inactive", vt.name),
        ));
    }
    Ok(vt)
}

/// Occupy a physical table on behalf of a virtual table
async fn attach(
    conn: &mut SqliteConnection,
    virtual_table_id: i64,
    table_id: i64,
) -> AppResult<(PhysicalTableRef, DiningTable)> {
    let table = get_table(&mut *conn, table_id).await?;
    let member = PhysicalTableRef {
        table_id,
        table_number: table.number.clone(),
        original_status: table.status,
        capacity: table.capacity,
    };
    let attached = dining_table::attach_to_virtual(&mut *conn, table_id, virtual_table_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::PhysicalTableInUse,
                format!(
                    "Table {} is {} or already part of a virtual table",
                    table.number,
                    table.status.as_str()
                ),
            )
        })?;
    Ok((member, attached))
}
