//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use shared::util::snowflake_id;
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, number, capacity, status, section_id, virtual_table_id";

fn duplicate_number(err: sqlx::Error) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Table number already exists".into()),
        other => other,
    }
}

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table ORDER BY number"
    ))
    .fetch_all(db)
    .await?;
    Ok(tables)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(table)
}

pub async fn find_by_number(
    db: impl SqliteExecutor<'_>,
    number: &str,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE number = ?"
    ))
    .bind(number)
    .fetch_optional(db)
    .await?;
    Ok(table)
}

pub async fn find_by_section(
    db: impl SqliteExecutor<'_>,
    section_id: i64,
) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE section_id = ? ORDER BY number"
    ))
    .bind(section_id)
    .fetch_all(db)
    .await?;
    Ok(tables)
}

/// Available tables not already part of a virtual table
pub async fn find_combinable(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table \
         WHERE status = 'available' AND virtual_table_id IS NULL ORDER BY number"
    ))
    .fetch_all(db)
    .await?;
    Ok(tables)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    data: &DiningTableCreate,
) -> RepoResult<DiningTable> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "INSERT INTO dining_table (id, number, capacity, status, section_id) \
         VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(&data.number)
    .bind(data.capacity.unwrap_or(4))
    .bind(data.status.unwrap_or(TableStatus::Available))
    .bind(data.section_id)
    .fetch_one(db)
    .await
    .map_err(duplicate_number)?;
    Ok(table)
}

pub async fn update(
    db: impl SqliteExecutor<'_>,
    id: i64,
    data: &DiningTableUpdate,
) -> RepoResult<DiningTable> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET number = COALESCE(?1, number), capacity = COALESCE(?2, capacity), \
         status = COALESCE(?3, status), section_id = COALESCE(?4, section_id) \
         WHERE id = ?5 RETURNING {COLUMNS}"
    ))
    .bind(&data.number)
    .bind(data.capacity)
    .bind(data.status)
    .bind(data.section_id)
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(duplicate_number)?;
    table.ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

pub async fn update_status(
    db: impl SqliteExecutor<'_>,
    id: i64,
    status: TableStatus,
) -> RepoResult<DiningTable> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET status = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(status)
    .bind(id)
    .fetch_optional(db)
    .await?;
    table.ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// Attach a table to a virtual table, returning `None` when it is no longer
/// available or already attached elsewhere
pub async fn attach_to_virtual(
    db: impl SqliteExecutor<'_>,
    id: i64,
    virtual_table_id: i64,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "UPDATE dining_table SET status = 'occupied', virtual_table_id = ? \
         WHERE id = ? AND status = 'available' AND virtual_table_id IS NULL \
         RETURNING {COLUMNS}"
    ))
    .bind(virtual_table_id)
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(table)
}

/// Detach a table from its virtual table and restore its status
pub async fn detach_from_virtual(
    db: impl SqliteExecutor<'_>,
    id: i64,
    restore: TableStatus,
) -> RepoResult<()> {
    sqlx::query("UPDATE dining_table SET status = ?, virtual_table_id = NULL WHERE id = ?")
        .bind(restore)
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn table(number: &str) -> DiningTableCreate {
        DiningTableCreate {
            number: number.into(),
            capacity: None,
            status: None,
            section_id: None,
        }
    }

    #[tokio::test]
    async fn create_uses_defaults_and_rejects_duplicate_numbers() {
        let pool = test_pool().await;
        let t = create(&pool, &table("T1")).await.unwrap();
        assert_eq!(t.capacity, 4);
        assert_eq!(t.status, TableStatus::Available);

        let err = create(&pool, &table("T1")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn attach_only_succeeds_once() {
        let pool = test_pool().await;
        let t = create(&pool, &table("T1")).await.unwrap();

        let attached = attach_to_virtual(&pool, t.id, 99).await.unwrap().unwrap();
        assert_eq!(attached.status, TableStatus::Occupied);
        assert_eq!(attached.virtual_table_id, Some(99));
        assert!(attach_to_virtual(&pool, t.id, 100).await.unwrap().is_none());
        assert!(find_combinable(&pool).await.unwrap().is_empty());

        detach_from_virtual(&pool, t.id, TableStatus::Available).await.unwrap();
        assert_eq!(find_combinable(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete_missing_table() {
        let pool = test_pool().await;
        let err = update(&pool, 1, &DiningTableUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
        let err = delete(&pool, 1).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
