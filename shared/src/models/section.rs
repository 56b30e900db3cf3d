//! Section Model (dining room areas grouping tables)

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::dining_table::DiningTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub created_at: i64,
}

/// Section with its tables resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWithTables {
    #[serde(flatten)]
    pub section: Section,
    pub tables: Vec<DiningTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SectionCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SectionUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}
