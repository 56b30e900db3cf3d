//! Section Repository

use super::{RepoError, RepoResult};
use shared::models::Section;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

fn duplicate_name(err: sqlx::Error) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Section name already exists".into()),
        other => other,
    }
}

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Section>> {
    let sections =
        sqlx::query_as::<_, Section>("SELECT id, name, created_at FROM section ORDER BY name")
            .fetch_all(db)
            .await?;
    Ok(sections)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Section>> {
    let section =
        sqlx::query_as::<_, Section>("SELECT id, name, created_at FROM section WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(section)
}

pub async fn create(db: impl SqliteExecutor<'_>, name: &str) -> RepoResult<Section> {
    let section = sqlx::query_as::<_, Section>(
        "INSERT INTO section (id, name, created_at) VALUES (?, ?, ?) RETURNING id, name, created_at",
    )
    .bind(snowflake_id())
    .bind(name)
    .bind(now_millis())
    .fetch_one(db)
    .await
    .map_err(duplicate_name)?;
    Ok(section)
}

pub async fn rename(db: impl SqliteExecutor<'_>, id: i64, name: &str) -> RepoResult<Section> {
    let section = sqlx::query_as::<_, Section>(
        "UPDATE section SET name = ? WHERE id = ? RETURNING id, name, created_at",
    )
    .bind(name)
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(duplicate_name)?;
    section.ok_or_else(|| RepoError::NotFound(format!("Section {id} not found")))
}

/// Tables of a deleted section keep existing with `section_id = NULL`
pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM section WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Section {id} not found")));
    }
    Ok(())
}
