//! Inventory Repository

use super::{RepoError, RepoResult, to_json};
use shared::error::ErrorCode;
use shared::models::{InventoryItem, InventoryItemCreate, InventoryItemUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, name, quantity, unit, equivalent_ml, equivalent_gr, cost, tags, \
    preparation_instructions, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::InventoryItemNotFound,
        format!("Inventory item {id} not found"),
    )
}

fn duplicate_name(err: sqlx::Error) -> RepoError {
    match RepoError::from(err) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Inventory item already exists".into()),
        other => other,
    }
}

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<InventoryItem>> {
    let items = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {COLUMNS} FROM inventory_item ORDER BY name"
    ))
    .fetch_all(db)
    .await?;
    Ok(items)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<InventoryItem>> {
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {COLUMNS} FROM inventory_item WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(item)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    data: &InventoryItemCreate,
) -> RepoResult<InventoryItem> {
    let now = now_millis();
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "INSERT INTO inventory_item (id, name, quantity, unit, equivalent_ml, equivalent_gr, cost, tags, \
         preparation_instructions, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(data.name.trim())
    .bind(data.quantity)
    .bind(data.unit)
    .bind(data.equivalent_ml.unwrap_or(0.0))
    .bind(data.equivalent_gr.unwrap_or(0.0))
    .bind(data.cost.unwrap_or(0.0))
    .bind(to_json(&data.tags)?)
    .bind(data.preparation_instructions.as_deref().unwrap_or(""))
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
    .map_err(duplicate_name)?;
    Ok(item)
}

pub async fn update(
    db: impl SqliteExecutor<'_>,
    id: i64,
    data: &InventoryItemUpdate,
) -> RepoResult<InventoryItem> {
    let tags = data.tags.as_ref().map(|t| to_json(t)).transpose()?;
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "UPDATE inventory_item SET name = COALESCE(?, name), quantity = COALESCE(?, quantity), \
         unit = COALESCE(?, unit), equivalent_ml = COALESCE(?, equivalent_ml), \
         equivalent_gr = COALESCE(?, equivalent_gr), cost = COALESCE(?, cost), tags = COALESCE(?, tags), \
         preparation_instructions = COALESCE(?, preparation_instructions), updated_at = ? \
         WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.quantity)
    .bind(data.unit)
    .bind(data.equivalent_ml)
    .bind(data.equivalent_gr)
    .bind(data.cost)
    .bind(tags)
    .bind(&data.preparation_instructions)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(duplicate_name)?;
    item.ok_or_else(|| not_found(id))
}

/// Tolerance for float drift in stored quantities
const STOCK_EPSILON: f64 = 1e-9;

/// Subtract `amount` only if enough stock remains; `false` when it does not
///
/// Stored quantities are rounded to 6 decimals after every change.
pub async fn try_decrement(db: impl SqliteExecutor<'_>, id: i64, amount: f64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE inventory_item SET quantity = MAX(ROUND(quantity - ?1, 6), 0), updated_at = ?2 \
         WHERE id = ?3 AND quantity >= ?1 - ?4",
    )
    .bind(amount)
    .bind(now_millis())
    .bind(id)
    .bind(STOCK_EPSILON)
    .execute(db)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn increment(db: impl SqliteExecutor<'_>, id: i64, amount: f64) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE inventory_item SET quantity = ROUND(quantity + ?, 6), updated_at = ? WHERE id = ?",
    )
    .bind(amount)
    .bind(now_millis())
    .bind(id)
    .execute(db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM inventory_item WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use shared::models::Unit;

    fn flour(quantity: f64) -> InventoryItemCreate {
        InventoryItemCreate {
            name: "Harina".into(),
            quantity,
            unit: Unit::G,
            equivalent_ml: None,
            equivalent_gr: None,
            cost: None,
            tags: vec!["seco".into()],
            preparation_instructions: None,
        }
    }

    #[tokio::test]
    async fn decrement_never_goes_negative() {
        let pool = test_pool().await;
        let item = create(&pool, &flour(100.0)).await.unwrap();

        assert!(try_decrement(&pool, item.id, 60.0).await.unwrap());
        assert!(!try_decrement(&pool, item.id, 60.0).await.unwrap());
        let stored = find_by_id(&pool, item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 40.0);

        increment(&pool, item.id, 10.0).await.unwrap();
        let stored = find_by_id(&pool, item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 50.0);
    }

    #[tokio::test]
    async fn repeated_decrements_reach_exactly_zero() {
        let pool = test_pool().await;
        let mut beef = flour(0.3);
        beef.unit = Unit::Kg;
        let item = create(&pool, &beef).await.unwrap();

        for _ in 0..3 {
            assert!(try_decrement(&pool, item.id, 0.1).await.unwrap());
        }
        let stored = find_by_id(&pool, item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0.0);
        assert!(!try_decrement(&pool, item.id, 0.1).await.unwrap());

        increment(&pool, item.id, 0.1).await.unwrap();
        increment(&pool, item.id, 0.2).await.unwrap();
        let stored = find_by_id(&pool, item.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 0.3);
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let pool = test_pool().await;
        let item = create(&pool, &flour(100.0)).await.unwrap();
        let updated = update(
            &pool,
            item.id,
            &InventoryItemUpdate {
                cost: Some(2.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.cost, 2.5);
        assert_eq!(updated.tags, vec!["seco".to_string()]);
        assert_eq!(updated.unit, Unit::G);

        let err = update(&pool, 1, &InventoryItemUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::InventoryItemNotFound, _)));
    }
}
