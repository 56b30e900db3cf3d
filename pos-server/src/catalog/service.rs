//! Catalog Service - menu categories, menu items and inventory

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::PosEvent;
use shared::models::{
    Ingredient, InventoryItem, InventoryItemCreate, InventoryItemUpdate, MenuCategory,
    MenuCategoryCreate, MenuCategoryUpdate, MenuItem, MenuItemCreate, MenuItemQuery,
    MenuItemUpdate,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::deduction::incompatible;
use super::units;
use crate::db::repository::menu_item::MenuItemRow;
use crate::db::repository::{inventory, menu_category, menu_item};
use crate::services::{EventPublisher, emit};

/// Catalog CRUD with recipe validation
#[derive(Clone, Debug)]
pub struct CatalogService {
    pool: SqlitePool,
    events: Arc<dyn EventPublisher>,
}

impl CatalogService {
    pub fn new(pool: SqlitePool, events: Arc<dyn EventPublisher>) -> Self {
        Self { pool, events }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self) -> AppResult<Vec<MenuCategory>> {
        Ok(menu_category::find_all(&self.pool).await?)
    }

    pub async fn create_category(&self, data: MenuCategoryCreate) -> AppResult<MenuCategory> {
        let category = menu_category::create(&self.pool, &data).await?;
        tracing::info!(category_id = category.id, name = %category.name, "Menu category created");
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: i64,
        data: MenuCategoryUpdate,
    ) -> AppResult<MenuCategory> {
        Ok(menu_category::update(&self.pool, id, &data).await?)
    }

    /// Rejected while the category still has items
    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let mut conn = self.connection().await?;
        menu_category::delete(&mut conn, id).await?;
        tracing::info!(category_id = id, "Menu category deleted");
        Ok(())
    }

    // =========================================================================
    // Menu items
    // =========================================================================

    /// Filter by `category` id or `categoryName`; an unknown name yields nothing
    pub async fn list_items(&self, query: MenuItemQuery) -> AppResult<Vec<MenuItem>> {
        let category_id = match (query.category, query.category_name.as_deref()) {
            (Some(id), _) => Some(id),
            (None, Some(name)) => match menu_category::find_by_name(&self.pool, name).await? {
                Some(category) => Some(category.id),
                None => return Ok(Vec::new()),
            },
            (None, None) => None,
        };
        Ok(menu_item::find_all(&self.pool, category_id).await?)
    }

    pub async fn get_item(&self, id: i64) -> AppResult<MenuItem> {
        menu_item::find_by_id(&self.pool, id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        })
    }

    pub async fn create_item(&self, data: MenuItemCreate) -> AppResult<MenuItem> {
        let mut conn = self.connection().await?;
        self.check_category(&mut conn, data.category_id).await?;
        check_ingredients(&mut conn, &data.ingredients).await?;

        let row = MenuItemRow {
            name: data.name,
            description: data.description,
            price: data.price,
            category_id: data.category_id,
            ingredients: data.ingredients,
            comments: data.comments,
        };
        let item = menu_item::create(&mut *conn, &row).await?;
        tracing::info!(menu_item_id = item.id, name = %item.name, "Menu item created");
        Ok(item)
    }

    pub async fn update_item(&self, id: i64, data: MenuItemUpdate) -> AppResult<MenuItem> {
        let mut conn = self.connection().await?;
        let current = menu_item::find_by_id(&mut *conn, id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        })?;

        let mut row = MenuItemRow::from(current);
        if let Some(name) = data.name {
            row.name = name;
        }
        if let Some(description) = data.description {
            row.description = Some(description);
        }
        if let Some(price) = data.price {
            row.price = price;
        }
        if let Some(category_id) = data.category_id {
            self.check_category(&mut conn, category_id).await?;
            row.category_id = category_id;
        }
        if let Some(ingredients) = data.ingredients {
            check_ingredients(&mut conn, &ingredients).await?;
            row.ingredients = ingredients;
        }
        if let Some(comments) = data.comments {
            row.comments = comments;
        }

        Ok(menu_item::update(&mut *conn, id, &row).await?)
    }

    pub async fn delete_item(&self, id: i64) -> AppResult<()> {
        menu_item::delete(&self.pool, id).await?;
        tracing::info!(menu_item_id = id, "Menu item deleted");
        Ok(())
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub async fn list_inventory(&self) -> AppResult<Vec<InventoryItem>> {
        Ok(inventory::find_all(&self.pool).await?)
    }

    pub async fn get_inventory(&self, id: i64) -> AppResult<InventoryItem> {
        inventory::find_by_id(&self.pool, id).await?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::InventoryItemNotFound,
                format!("Inventory item {id} not found"),
            )
        })
    }

    pub async fn create_inventory(&self, data: InventoryItemCreate) -> AppResult<InventoryItem> {
        let item = inventory::create(&self.pool, &data).await?;
        tracing::info!(inventory_item_id = item.id, name = %item.name, "Inventory item created");
        emit(&*self.events, PosEvent::InventoryUpdated, &item);
        Ok(item)
    }

    pub async fn update_inventory(
        &self,
        id: i64,
        data: InventoryItemUpdate,
    ) -> AppResult<InventoryItem> {
        let item = inventory::update(&self.pool, id, &data).await?;
        emit(&*self.events, PosEvent::InventoryUpdated, &item);
        Ok(item)
    }

    pub async fn delete_inventory(&self, id: i64) -> AppResult<()> {
        inventory::delete(&self.pool, id).await?;
        tracing::info!(inventory_item_id = id, "Inventory item deleted");
        emit(
            &*self.events,
            PosEvent::InventoryUpdated,
            &serde_json::json!({ "id": id, "deleted": true }),
        );
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn connection(&self) -> AppResult<sqlx::pool::PoolConnection<sqlx::Sqlite>> {
        self.pool
            .acquire()
            .await
            .map_err(|e| AppError::database(format!("Failed to acquire connection: {e}")))
    }

    async fn check_category(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        if menu_category::find_by_id(&mut *conn, id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::CategoryNotFound,
                format!("Category {id} not found"),
            ));
        }
        Ok(())
    }
}

/// Every ingredient must exist and be convertible into its stock unit
async fn check_ingredients(conn: &mut SqliteConnection, ingredients: &[Ingredient]) -> AppResult<()> {
    for ingredient in ingredients {
        let stock = inventory::find_by_id(&mut *conn, ingredient.inventory_item_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InventoryItemNotFound,
                    format!("Inventory item {} not found", ingredient.inventory_item_id),
                )
            })?;
        if units::convert(ingredient.quantity, ingredient.unit, &stock).is_none() {
            return Err(incompatible(
                ingredient.unit.as_str(),
                &stock.name,
                stock.unit.as_str(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::services::events::testing::RecordingPublisher;
    use shared::models::{Area, Unit};

    async fn service() -> (CatalogService, Arc<RecordingPublisher>) {
        let recorder = Arc::new(RecordingPublisher::default());
        let service = CatalogService::new(test_pool().await, recorder.clone());
        (service, recorder)
    }

    fn category(name: &str) -> MenuCategoryCreate {
        MenuCategoryCreate {
            name: name.into(),
            description: None,
            area: Area::Kitchen,
        }
    }

    fn item(name: &str, category_id: i64, ingredients: Vec<Ingredient>) -> MenuItemCreate {
        MenuItemCreate {
            name: name.into(),
            description: None,
            price: 12.5,
            category_id,
            ingredients,
            comments: vec![],
        }
    }

    fn stock(name: &str, unit: Unit) -> InventoryItemCreate {
        InventoryItemCreate {
            name: name.into(),
            quantity: 1000.0,
            unit,
            equivalent_ml: None,
            equivalent_gr: None,
            cost: None,
            tags: vec![],
            preparation_instructions: None,
        }
    }

    #[tokio::test]
    async fn category_with_items_cannot_be_deleted() {
        let (svc, _) = service().await;
        let cat = svc.create_category(category("Tacos")).await.unwrap();
        let dish = svc.create_item(item("Pastor", cat.id, vec![])).await.unwrap();

        let err = svc.delete_category(cat.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryHasItems);

        svc.delete_item(dish.id).await.unwrap();
        svc.delete_category(cat.id).await.unwrap();
        let err = svc.delete_category(cat.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);
    }

    #[tokio::test]
    async fn item_ingredients_are_validated() {
        let (svc, _) = service().await;
        let cat = svc.create_category(category("Bebidas")).await.unwrap();
        let milk = svc.create_inventory(stock("Leche", Unit::L)).await.unwrap();

        let ok = vec![Ingredient {
            inventory_item_id: milk.id,
            quantity: 250.0,
            unit: Unit::Ml,
        }];
        svc.create_item(item("Licuado", cat.id, ok)).await.unwrap();

        let wrong_unit = vec![Ingredient {
            inventory_item_id: milk.id,
            quantity: 250.0,
            unit: Unit::G,
        }];
        let err = svc.create_item(item("Raro", cat.id, wrong_unit)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::IncompatibleUnits);

        let missing = vec![Ingredient {
            inventory_item_id: 404,
            quantity: 1.0,
            unit: Unit::L,
        }];
        let err = svc.create_item(item("Nada", cat.id, missing)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryItemNotFound);

        let err = svc.create_item(item("Huérfano", 404, vec![])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CategoryNotFound);
    }

    #[tokio::test]
    async fn items_filter_by_category_name() {
        let (svc, _) = service().await;
        let tacos = svc.create_category(category("Tacos")).await.unwrap();
        let drinks = svc.create_category(category("Bebidas")).await.unwrap();
        svc.create_item(item("Pastor", tacos.id, vec![])).await.unwrap();
        svc.create_item(item("Agua", drinks.id, vec![])).await.unwrap();

        let query = MenuItemQuery {
            category: None,
            category_name: Some("tacos".into()),
        };
        let items = svc.list_items(query).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Pastor");

        let query = MenuItemQuery {
            category: None,
            category_name: Some("Postres".into()),
        };
        assert!(svc.list_items(query).await.unwrap().is_empty());
        assert_eq!(svc.list_items(MenuItemQuery::default()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn item_update_merges_fields() {
        let (svc, _) = service().await;
        let cat = svc.create_category(category("Tacos")).await.unwrap();
        let dish = svc.create_item(item("Pastor", cat.id, vec![])).await.unwrap();

        let updated = svc
            .update_item(
                dish.id,
                MenuItemUpdate {
                    price: Some(15.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 15.0);
        assert_eq!(updated.name, "Pastor");
    }

    #[tokio::test]
    async fn inventory_changes_are_published() {
        let (svc, recorder) = service().await;
        let flour = svc.create_inventory(stock("Harina", Unit::Kg)).await.unwrap();
        svc.update_inventory(
            flour.id,
            InventoryItemUpdate {
                quantity: Some(5.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        svc.delete_inventory(flour.id).await.unwrap();

        assert_eq!(recorder.events(), vec![PosEvent::InventoryUpdated; 3]);
        let err = svc.get_inventory(flour.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InventoryItemNotFound);
    }
}
