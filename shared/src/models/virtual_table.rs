//! Virtual Table Model
//!
//! A virtual table is either a standalone logical table with its own
//! capacity, or a combination of physical tables whose capacity is the sum
//! of its members.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::dining_table::TableStatus;

/// Maximum capacity of a standalone virtual table
pub const MAX_VIRTUAL_CAPACITY: i32 = 50;
/// Maximum number of tables created by one generate request
pub const MAX_GENERATED_TABLES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum VirtualTableMode {
    Standalone,
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum VirtualTableStatus {
    Available,
    Occupied,
    Reserved,
    Inactive,
}

/// Physical member of a combined virtual table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalTableRef {
    pub table_id: i64,
    pub table_number: String,
    /// Status to restore when the table leaves the virtual table
    pub original_status: TableStatus,
    pub capacity: i32,
}

/// Virtual table entity (虚拟桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct VirtualTable {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub mode: VirtualTableMode,
    pub capacity: i32,
    pub total_capacity: i32,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub physical_tables: Vec<PhysicalTableRef>,
    pub status: VirtualTableStatus,
    pub current_guests: i32,
    pub current_session_id: Option<i64>,
    pub current_waiter_id: Option<i64>,
    pub session_started_at: Option<i64>,
    pub is_active: bool,
    pub allow_separate_orders: bool,
    pub combine_billing: bool,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub last_used_at: i64,
    pub created_at: i64,
}

impl VirtualTable {
    /// Capacity derived from the mode
    pub fn computed_capacity(&self) -> i32 {
        match self.mode {
            VirtualTableMode::Standalone => self.capacity,
            VirtualTableMode::Combined => self.physical_tables.iter().map(|t| t.capacity).sum(),
        }
    }

    pub fn contains_table(&self, table_id: i64) -> bool {
        self.physical_tables.iter().any(|t| t.table_id == table_id)
    }
}

/// Optional behaviour flags
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTableConfiguration {
    #[serde(default)]
    pub allow_separate_orders: bool,
    #[serde(default = "default_true")]
    pub combine_billing: bool,
    pub notes: Option<String>,
}

impl Default for VirtualTableConfiguration {
    fn default() -> Self {
        Self {
            allow_separate_orders: false,
            combine_billing: true,
            notes: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTableCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: VirtualTableMode,
    /// Standalone only
    pub capacity: Option<i32>,
    /// Combined only, at least two
    #[serde(default)]
    pub physical_table_ids: Vec<i64>,
    pub configuration: Option<VirtualTableConfiguration>,
}

fn default_mode() -> VirtualTableMode {
    VirtualTableMode::Standalone
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTableQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPhysicalTable {
    pub table_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VirtualSessionStart {
    pub waiter_id: Option<i64>,
    #[validate(range(min = 1, max = 200))]
    pub number_of_guests: i32,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVirtualTables {
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 20))]
    pub count: u32,
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 50))]
    pub base_capacity: i32,
    #[serde(default = "default_prefix")]
    #[validate(length(min = 1, max = 100))]
    pub name_prefix: String,
}

fn default_count() -> u32 {
    5
}

fn default_capacity() -> i32 {
    4
}

fn default_prefix() -> String {
    "Mesa".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn combined(tables: Vec<PhysicalTableRef>) -> VirtualTable {
        VirtualTable {
            id: 1,
            name: "Terraza".into(),
            description: String::new(),
            mode: VirtualTableMode::Combined,
            capacity: 0,
            total_capacity: 0,
            physical_tables: tables,
            status: VirtualTableStatus::Available,
            current_guests: 0,
            current_session_id: None,
            current_waiter_id: None,
            session_started_at: None,
            is_active: true,
            allow_separate_orders: false,
            combine_billing: true,
            notes: None,
            created_by: None,
            last_used_at: 0,
            created_at: 0,
        }
    }

    fn member(id: i64, capacity: i32) -> PhysicalTableRef {
        PhysicalTableRef {
            table_id: id,
            table_number: format!("T{id}"),
            original_status: TableStatus::Available,
            capacity,
        }
    }

    #[test]
    fn combined_capacity_is_sum_of_members() {
        let vt = combined(vec![member(1, 4), member(2, 6)]);
        assert_eq!(vt.computed_capacity(), 10);
        assert!(vt.contains_table(2));
        assert!(!vt.contains_table(3));
    }

    #[test]
    fn generate_defaults() {
        let req: GenerateVirtualTables = serde_json::from_str("{}").unwrap();
        assert_eq!(req.count, 5);
        assert_eq!(req.base_capacity, 4);
        assert_eq!(req.name_prefix, "Mesa");
        assert!(req.validate().is_ok());

        let req: GenerateVirtualTables = serde_json::from_str(r#"{"count": 21}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
