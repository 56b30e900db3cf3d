//! Setting Repository

use super::{RepoResult, to_json};
use shared::models::Setting;
use shared::util::now_millis;
use sqlx::SqliteExecutor;

pub async fn find(db: impl SqliteExecutor<'_>, key: &str) -> RepoResult<Option<Setting>> {
    let setting =
        sqlx::query_as::<_, Setting>("SELECT key, value, updated_at FROM setting WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;
    Ok(setting)
}

pub async fn upsert(
    db: impl SqliteExecutor<'_>,
    key: &str,
    value: &serde_json::Value,
) -> RepoResult<Setting> {
    let setting = sqlx::query_as::<_, Setting>(
        "INSERT INTO setting (key, value, updated_at) VALUES (?1, ?2, ?3) \
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3 \
         RETURNING key, value, updated_at",
    )
    .bind(key)
    .bind(to_json(value)?)
    .bind(now_millis())
    .fetch_one(db)
    .await?;
    Ok(setting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_overwrites() {
        let pool = test_pool().await;
        assert!(find(&pool, "currency").await.unwrap().is_none());

        upsert(&pool, "currency", &json!("MXN")).await.unwrap();
        let setting = upsert(&pool, "currency", &json!({"code": "USD"})).await.unwrap();
        assert_eq!(setting.value["code"], "USD");

        let stored = find(&pool, "currency").await.unwrap().unwrap();
        assert_eq!(stored.value, json!({"code": "USD"}));
    }
}
