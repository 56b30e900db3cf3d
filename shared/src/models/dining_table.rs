//! Dining Table Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Physical table status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TableStatus {
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
        }
    }
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    /// Display number, e.g. "T1"
    pub number: String,
    pub capacity: i32,
    pub status: TableStatus,
    pub section_id: Option<i64>,
    pub virtual_table_id: Option<i64>,
}

impl DiningTable {
    pub fn is_part_of_virtual(&self) -> bool {
        self.virtual_table_id.is_some()
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    #[validate(length(min = 1, max = 50))]
    pub number: String,
    #[validate(range(min = 1, max = 50))]
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
    pub section_id: Option<i64>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    #[validate(length(min = 1, max = 50))]
    pub number: Option<String>,
    #[validate(range(min = 1, max = 50))]
    pub capacity: Option<i32>,
    pub status: Option<TableStatus>,
    pub section_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatusUpdate {
    pub status: TableStatus,
}
