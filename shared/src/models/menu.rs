//! Menu Category / Menu Item Models

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::inventory::Unit;

/// Preparation area a category routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Area {
    Kitchen,
    Bar,
}

impl Area {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Bar => "bar",
        }
    }
}

/// Menu category entity (菜单分类)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub area: Area,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuCategoryCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub area: Area,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuCategoryUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub area: Option<Area>,
}

/// Recipe line: how much of an inventory item one portion consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub inventory_item_id: i64,
    #[validate(range(exclusive_min = 0.0))]
    pub quantity: f64,
    pub unit: Unit,
}

/// Menu item entity (菜品)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub ingredients: Vec<Ingredient>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub price: f64,
    #[serde(alias = "category")]
    pub category_id: i64,
    #[serde(default)]
    #[validate(nested)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 1000000.0))]
    pub price: Option<f64>,
    #[serde(alias = "category")]
    pub category_id: Option<i64>,
    #[validate(nested)]
    pub ingredients: Option<Vec<Ingredient>>,
    pub comments: Option<Vec<String>>,
}

/// `?category=<id>` or `?categoryName=<name>`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemQuery {
    pub category: Option<i64>,
    pub category_name: Option<String>,
}
