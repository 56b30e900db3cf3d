//! Permission Repository

use super::{RepoError, RepoResult};
use shared::models::Permission;
use shared::util::snowflake_id;
use sqlx::SqliteExecutor;

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<Permission>> {
    let permissions = sqlx::query_as::<_, Permission>(
        "SELECT id, name, description FROM permission ORDER BY name",
    )
    .fetch_all(db)
    .await?;
    Ok(permissions)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    name: &str,
    description: Option<&str>,
) -> RepoResult<Permission> {
    let permission = sqlx::query_as::<_, Permission>(
        "INSERT INTO permission (id, name, description) VALUES (?, ?, ?) \
         RETURNING id, name, description",
    )
    .bind(snowflake_id())
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Permission '{name}' already exists"))
        }
        other => other,
    })?;
    Ok(permission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn builtin_permissions_are_seeded() {
        let pool = test_pool().await;
        let names: Vec<String> = find_all(&pool).await.unwrap().into_iter().map(|p| p.name).collect();
        assert!(names.contains(&"all".to_string()));
        assert!(names.contains(&"payments:process".to_string()));

        let err = create(&pool, "all", None).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let created = create(&pool, "kitchen:view", Some("Kitchen screen")).await.unwrap();
        assert_eq!(created.description.as_deref(), Some("Kitchen screen"));
    }
}
