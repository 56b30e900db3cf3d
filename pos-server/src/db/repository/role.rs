//! Role Repository

use super::{RepoError, RepoResult, to_json};
use shared::models::Role;
use shared::util::snowflake_id;
use sqlx::{SqliteConnection, SqliteExecutor};

pub async fn find_all(db: impl SqliteExecutor<'_>, group_id: Option<i64>) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT id, name, permissions, group_id FROM role \
         WHERE (?1 IS NULL OR group_id = ?1) ORDER BY name",
    )
    .bind(group_id)
    .fetch_all(db)
    .await?;
    Ok(roles)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, permissions, group_id FROM role WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(role)
}

pub async fn find_by_name(db: impl SqliteExecutor<'_>, name: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, permissions, group_id FROM role WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(role)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    name: &str,
    permissions: &[String],
    group_id: Option<i64>,
) -> RepoResult<Role> {
    let role = sqlx::query_as::<_, Role>(
        "INSERT INTO role (id, name, permissions, group_id) VALUES (?, ?, ?, ?) \
         RETURNING id, name, permissions, group_id",
    )
    .bind(snowflake_id())
    .bind(name)
    .bind(to_json(permissions)?)
    .bind(group_id)
    .fetch_one(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Role '{name}' already exists")),
        other => other,
    })?;
    Ok(role)
}

/// Role by name, created empty when missing
pub async fn find_or_create(conn: &mut SqliteConnection, name: &str) -> RepoResult<Role> {
    if let Some(role) = find_by_name(&mut *conn, name).await? {
        return Ok(role);
    }
    create(&mut *conn, name, &[], None).await
}

/// Union the given permissions into the role's set
pub async fn add_permissions(
    conn: &mut SqliteConnection,
    role_id: i64,
    permissions: &[String],
) -> RepoResult<Role> {
    let mut role = find_by_id(&mut *conn, role_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Role {role_id} not found")))?;

    for permission in permissions {
        if !role.permissions.contains(permission) {
            role.permissions.push(permission.clone());
        }
    }

    sqlx::query("UPDATE role SET permissions = ? WHERE id = ?")
        .bind(to_json(&role.permissions)?)
        .bind(role_id)
        .execute(&mut *conn)
        .await?;
    Ok(role)
}
