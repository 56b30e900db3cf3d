//! Menu Item Repository

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{Area, Ingredient, MenuItem};
use shared::util::snowflake_id;
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, name, description, price, category_id, ingredients, comments";

/// Fully resolved row for insert/update
#[derive(Debug, Clone)]
pub struct MenuItemRow {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i64,
    pub ingredients: Vec<Ingredient>,
    pub comments: Vec<String>,
}

impl From<MenuItem> for MenuItemRow {
    fn from(item: MenuItem) -> Self {
        Self {
            name: item.name,
            description: item.description,
            price: item.price,
            category_id: item.category_id,
            ingredients: item.ingredients,
            comments: item.comments,
        }
    }
}

/// Menu item joined with its category's area
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoutedMenuItem {
    #[sqlx(flatten)]
    pub item: MenuItem,
    pub area: Area,
}

pub async fn find_all(
    db: impl SqliteExecutor<'_>,
    category_id: Option<i64>,
) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE (?1 IS NULL OR category_id = ?1) ORDER BY name"
    ))
    .bind(category_id)
    .fetch_all(db)
    .await?;
    Ok(items)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!("SELECT {COLUMNS} FROM menu_item WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(item)
}

/// Case-insensitive lookup by name
pub async fn find_by_name(db: impl SqliteExecutor<'_>, name: &str) -> RepoResult<Option<MenuItem>> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE name = ? COLLATE NOCASE LIMIT 1"
    ))
    .bind(name.trim())
    .fetch_optional(db)
    .await?;
    Ok(item)
}

/// Menu item with the area of its category
pub async fn find_routed(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<RoutedMenuItem> {
    let item = sqlx::query_as::<_, RoutedMenuItem>(
        "SELECT m.id, m.name, m.description, m.price, m.category_id, m.ingredients, m.comments, c.area \
         FROM menu_item m JOIN menu_category c ON c.id = m.category_id WHERE m.id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    item.ok_or_else(|| {
        RepoError::Business(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
    })
}

pub async fn create(db: impl SqliteExecutor<'_>, row: &MenuItemRow) -> RepoResult<MenuItem> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "INSERT INTO menu_item (id, name, description, price, category_id, ingredients, comments) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(row.name.trim())
    .bind(&row.description)
    .bind(row.price)
    .bind(row.category_id)
    .bind(to_json(&row.ingredients)?)
    .bind(to_json(&row.comments)?)
    .fetch_one(db)
    .await?;
    Ok(item)
}

pub async fn update(db: impl SqliteExecutor<'_>, id: i64, row: &MenuItemRow) -> RepoResult<MenuItem> {
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "UPDATE menu_item SET name = ?, description = ?, price = ?, category_id = ?, \
         ingredients = ?, comments = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(row.name.trim())
    .bind(&row.description)
    .bind(row.price)
    .bind(row.category_id)
    .bind(to_json(&row.ingredients)?)
    .bind(to_json(&row.comments)?)
    .bind(id)
    .fetch_optional(db)
    .await?;
    item.ok_or_else(|| {
        RepoError::Business(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
    })
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::MenuItemNotFound,
            format!("Menu item {id} not found"),
        ));
    }
    Ok(())
}
