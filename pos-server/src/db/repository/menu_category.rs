//! Menu Category Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{MenuCategory, MenuCategoryCreate, MenuCategoryUpdate};
use shared::util::snowflake_id;
use sqlx::{SqliteConnection, SqliteExecutor};

fn duplicate_name(err: sqlx::Error) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Category name already exists".into()),
        other => other,
    }
}

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<MenuCategory>> {
    let categories = sqlx::query_as::<_, MenuCategory>(
        "SELECT id, name, description, area FROM menu_category ORDER BY name",
    )
    .fetch_all(db)
    .await?;
    Ok(categories)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<MenuCategory>> {
    let category = sqlx::query_as::<_, MenuCategory>(
        "SELECT id, name, description, area FROM menu_category WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(category)
}

pub async fn find_by_name(
    db: impl SqliteExecutor<'_>,
    name: &str,
) -> RepoResult<Option<MenuCategory>> {
    let category = sqlx::query_as::<_, MenuCategory>(
        "SELECT id, name, description, area FROM menu_category WHERE name = ? COLLATE NOCASE",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(category)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    data: &MenuCategoryCreate,
) -> RepoResult<MenuCategory> {
    let category = sqlx::query_as::<_, MenuCategory>(
        "INSERT INTO menu_category (id, name, description, area) VALUES (?, ?, ?, ?) \
         RETURNING id, name, description, area",
    )
    .bind(snowflake_id())
    .bind(data.name.trim())
    .bind(&data.description)
    .bind(data.area)
    .fetch_one(db)
    .await
    .map_err(duplicate_name)?;
    Ok(category)
}

pub async fn update(
    db: impl SqliteExecutor<'_>,
    id: i64,
    data: &MenuCategoryUpdate,
) -> RepoResult<MenuCategory> {
    let category = sqlx::query_as::<_, MenuCategory>(
        "UPDATE menu_category SET name = COALESCE(?, name), description = COALESCE(?, description), \
         area = COALESCE(?, area) WHERE id = ? RETURNING id, name, description, area",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.description)
    .bind(data.area)
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(duplicate_name)?;
    category.ok_or_else(|| {
        RepoError::Business(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
    })
}

/// Delete a category with no items left
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let result = sqlx::query(
        "DELETE FROM menu_category WHERE id = ? \
         AND NOT EXISTS (SELECT 1 FROM menu_item WHERE category_id = menu_category.id)",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() > 0 {
        return Ok(());
    }

    match find_by_id(&mut *conn, id).await? {
        None => Err(RepoError::Business(
            ErrorCode::CategoryNotFound,
            format!("Category {id} not found"),
        )),
        Some(_) => Err(RepoError::Business(
            ErrorCode::CategoryHasItems,
            "Category still has menu items".into(),
        )),
    }
}
