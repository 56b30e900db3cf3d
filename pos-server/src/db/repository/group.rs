//! Group Repository

use super::{RepoError, RepoResult};
use shared::models::Group;
use shared::util::snowflake_id;
use sqlx::SqliteExecutor;

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Group>> {
    let groups =
        sqlx::query_as::<_, Group>("SELECT id, name, description FROM role_group ORDER BY name")
            .fetch_all(db)
            .await?;
    Ok(groups)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Group>> {
    let group =
        sqlx::query_as::<_, Group>("SELECT id, name, description FROM role_group WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
    Ok(group)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    name: &str,
    description: Option<&str>,
) -> RepoResult<Group> {
    let group = sqlx::query_as::<_, Group>(
        "INSERT INTO role_group (id, name, description) VALUES (?, ?, ?) \
         RETURNING id, name, description",
    )
    .bind(snowflake_id())
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Group '{name}' already exists")),
        other => other,
    })?;
    Ok(group)
}
