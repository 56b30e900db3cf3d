//! Virtual Table Repository

use super::{RepoError, RepoResult, to_json};
use shared::models::{PhysicalTableRef, VirtualTable, VirtualTableMode, VirtualTableStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, name, description, mode, capacity, total_capacity, physical_tables, \
    status, current_guests, current_session_id, current_waiter_id, session_started_at, is_active, \
    allow_separate_orders, combine_billing, notes, created_by, last_used_at, created_at";

/// Row to insert
#[derive(Debug, Clone)]
pub struct NewVirtualTable {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub mode: VirtualTableMode,
    pub capacity: i32,
    pub physical_tables: Vec<PhysicalTableRef>,
    pub allow_separate_orders: bool,
    pub combine_billing: bool,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
}

impl NewVirtualTable {
    /// Standalone row with a fresh id
    pub fn standalone(name: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: snowflake_id(),
            name: name.into(),
            description: String::new(),
            mode: VirtualTableMode::Standalone,
            capacity,
            physical_tables: Vec::new(),
            allow_separate_orders: false,
            combine_billing: true,
            notes: None,
            created_by: None,
        }
    }

    fn total_capacity(&self) -> i32 {
        match self.mode {
            VirtualTableMode::Standalone => self.capacity,
            VirtualTableMode::Combined => self.physical_tables.iter().map(|t| t.capacity).sum(),
        }
    }
}

/// Session bookkeeping on the virtual table row
#[derive(Debug, Clone, Copy)]
pub struct SessionInfo {
    pub session_id: i64,
    pub waiter_id: Option<i64>,
    pub guests: i32,
}

pub async fn find_all(
    db: impl SqliteExecutor<'_>,
    active: Option<bool>,
) -> RepoResult<Vec<VirtualTable>> {
    let tables = sqlx::query_as::<_, VirtualTable>(&format!(
        "SELECT {COLUMNS} FROM virtual_table WHERE (?1 IS NULL OR is_active = ?1) \
         ORDER BY last_used_at DESC"
    ))
    .bind(active)
    .fetch_all(db)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<VirtualTable>> {
    let table = sqlx::query_as::<_, VirtualTable>(&format!(
        "SELECT {COLUMNS} FROM virtual_table WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(table)
}

pub async fn name_exists(db: impl SqliteExecutor<'_>, name: &str) -> RepoResult<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM virtual_table WHERE name = ? AND is_active = 1)",
    )
    .bind(name)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn create(db: impl SqliteExecutor<'_>, data: &NewVirtualTable) -> RepoResult<VirtualTable> {
    let now = now_millis();
    let table = sqlx::query_as::<_, VirtualTable>(&format!(
        "INSERT INTO virtual_table (id, name, description, mode, capacity, total_capacity, physical_tables, \
         status, allow_separate_orders, combine_billing, notes, created_by, last_used_at, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 'available', ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(data.id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.mode)
    .bind(data.capacity)
    .bind(data.total_capacity())
    .bind(to_json(&data.physical_tables)?)
    .bind(data.allow_separate_orders)
    .bind(data.combine_billing)
    .bind(&data.notes)
    .bind(data.created_by)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;
    Ok(table)
}

/// Replace the member list; total capacity follows the members
pub async fn set_physical_tables(
    db: impl SqliteExecutor<'_>,
    id: i64,
    tables: &[PhysicalTableRef],
) -> RepoResult<VirtualTable> {
    let total: i32 = tables.iter().map(|t| t.capacity).sum();
    let table = sqlx::query_as::<_, VirtualTable>(&format!(
        "UPDATE virtual_table SET physical_tables = ?, total_capacity = ?, last_used_at = ? \
         WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(to_json(tables)?)
    .bind(total)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(db)
    .await?;
    table.ok_or_else(|| RepoError::NotFound(format!("Virtual table {id} not found")))
}

/// Occupy the table, returning `None` when it is not available
pub async fn start_session(
    db: impl SqliteExecutor<'_>,
    id: i64,
    info: SessionInfo,
) -> RepoResult<Option<VirtualTable>> {
    let now = now_millis();
    let table = sqlx::query_as::<_, VirtualTable>(&format!(
        "UPDATE virtual_table SET status = 'occupied', current_session_id = ?, current_waiter_id = ?, \
         current_guests = ?, session_started_at = ?, last_used_at = ? \
         WHERE id = ? AND status = 'available' AND is_active = 1 RETURNING {COLUMNS}"
    ))
    .bind(info.session_id)
    .bind(info.waiter_id)
    .bind(info.guests)
    .bind(now)
    .bind(now)
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(table)
}

pub async fn clear_session(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<VirtualTable> {
    let table = sqlx::query_as::<_, VirtualTable>(&format!(
        "UPDATE virtual_table SET status = 'available', current_session_id = NULL, \
         current_waiter_id = NULL, current_guests = 0, session_started_at = NULL, last_used_at = ? \
         WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(now_millis())
    .bind(id)
    .fetch_optional(db)
    .await?;
    table.ok_or_else(|| RepoError::NotFound(format!("Virtual table {id} not found")))
}

/// Deactivate unless occupied; members are emptied
pub async fn deactivate(
    db: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<VirtualTable>> {
    let table = sqlx::query_as::<_, VirtualTable>(&format!(
        "UPDATE virtual_table SET is_active = 0, status = ?, physical_tables = '[]', total_capacity = \
         CASE WHEN mode = 'standalone' THEN capacity ELSE 0 END \
         WHERE id = ? AND status != 'occupied' RETURNING {COLUMNS}"
    ))
    .bind(VirtualTableStatus::Inactive)
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use shared::models::TableStatus;

    #[tokio::test]
    async fn standalone_lifecycle() {
        let pool = test_pool().await;
        let vt = create(&pool, &NewVirtualTable::standalone("Mesa 1", 6)).await.unwrap();
        assert_eq!(vt.total_capacity, 6);
        assert_eq!(vt.status, VirtualTableStatus::Available);
        assert!(name_exists(&pool, "Mesa 1").await.unwrap());

        let info = SessionInfo {
            session_id: 10,
            waiter_id: Some(3),
            guests: 4,
        };
        let occupied = start_session(&pool, vt.id, info).await.unwrap().unwrap();
        assert_eq!(occupied.current_guests, 4);
        assert!(start_session(&pool, vt.id, info).await.unwrap().is_none());
        assert!(deactivate(&pool, vt.id).await.unwrap().is_none());

        let cleared = clear_session(&pool, vt.id).await.unwrap();
        assert_eq!(cleared.current_session_id, None);
        let inactive = deactivate(&pool, vt.id).await.unwrap().unwrap();
        assert!(!inactive.is_active);
        assert_eq!(inactive.status, VirtualTableStatus::Inactive);
        assert_eq!(find_all(&pool, Some(true)).await.unwrap().len(), 0);
        assert_eq!(find_all(&pool, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn combined_capacity_follows_members() {
        let pool = test_pool().await;
        let member = |id: i64, capacity: i32| PhysicalTableRef {
            table_id: id,
            table_number: format!("T{id}"),
            original_status: TableStatus::Available,
            capacity,
        };
        let mut data = NewVirtualTable::standalone("Terraza", 0);
        data.mode = VirtualTableMode::Combined;
        data.physical_tables = vec![member(1, 4), member(2, 2)];

        let vt = create(&pool, &data).await.unwrap();
        assert_eq!(vt.total_capacity, 6);

        let vt = set_physical_tables(&pool, vt.id, &[member(1, 4)]).await.unwrap();
        assert_eq!(vt.total_capacity, 4);
        assert_eq!(vt.physical_tables.len(), 1);
    }
}
