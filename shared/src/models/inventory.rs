//! Inventory Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Unit of measure for stock and recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Unit {
    Ml,
    L,
    G,
    Kg,
    Unit,
    Bottle,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ml => "ml",
            Self::L => "l",
            Self::G => "g",
            Self::Kg => "kg",
            Self::Unit => "unit",
            Self::Bottle => "bottle",
        }
    }
}

/// Inventory item entity (库存)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    /// Quantity on hand, in `unit`
    pub quantity: f64,
    pub unit: Unit,
    /// Millilitres per bottle
    pub equivalent_ml: f64,
    /// Grams per unit
    pub equivalent_gr: f64,
    pub cost: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub tags: Vec<String>,
    pub preparation_instructions: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub quantity: f64,
    pub unit: Unit,
    #[validate(range(min = 0.0))]
    pub equivalent_ml: Option<f64>,
    #[validate(range(min = 0.0))]
    pub equivalent_gr: Option<f64>,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(max = 500))]
    pub preparation_instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    #[validate(range(min = 0.0))]
    pub equivalent_ml: Option<f64>,
    #[validate(range(min = 0.0))]
    pub equivalent_gr: Option<f64>,
    #[validate(range(min = 0.0))]
    pub cost: Option<f64>,
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 500))]
    pub preparation_instructions: Option<String>,
}
