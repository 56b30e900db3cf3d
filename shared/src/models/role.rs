//! Role / Permission / Group Models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Role entity (角色)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub name: String,
    /// Permission names
    #[cfg_attr(feature = "db", sqlx(json))]
    pub permissions: Vec<String>,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub group_id: Option<i64>,
}

/// Adds permissions to a role (set semantics, duplicates ignored)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignPermissions {
    pub role_id: i64,
    #[validate(length(min = 1))]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub group_id: Option<i64>,
}

/// Permission entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PermissionCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Group entity (tenant grouping for roles)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GroupCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}
