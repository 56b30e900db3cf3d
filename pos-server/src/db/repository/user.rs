//! User Repository

use super::{RepoError, RepoResult};
use shared::models::User;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqliteExecutor;

const COLUMNS: &str = "id, username, alias, pin, pin_expiration, role, role_id, password_hash, is_demo, notifications, dark_mode, created_at, updated_at";

/// Row to insert; hashing happens in the caller
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: Option<String>,
    pub alias: Option<String>,
    pub pin: String,
    pub pin_expiration: i64,
    pub role: Option<String>,
    pub role_id: Option<i64>,
    pub password_hash: Option<String>,
}

/// Profile fields; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub alias: Option<String>,
    pub role: Option<String>,
    pub role_id: Option<i64>,
    pub password_hash: Option<String>,
}

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user ORDER BY created_at"
    ))
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM user WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_username(
    db: impl SqliteExecutor<'_>,
    username: &str,
) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE username = ? LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

pub async fn find_by_pin(db: impl SqliteExecutor<'_>, pin: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE pin = ? LIMIT 1"
    ))
    .bind(pin)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Users whose PIN is still valid at `now`
pub async fn find_with_active_pin(
    db: impl SqliteExecutor<'_>,
    now: i64,
) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE pin_expiration >= ? ORDER BY pin_expiration"
    ))
    .bind(now)
    .fetch_all(db)
    .await?;
    Ok(users)
}

pub async fn count(db: impl SqliteExecutor<'_>) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn create(db: impl SqliteExecutor<'_>, data: NewUser) -> RepoResult<User> {
    let now = now_millis();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO user (id, username, alias, pin, pin_expiration, role, role_id, password_hash, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(&data.username)
    .bind(&data.alias)
    .bind(&data.pin)
    .bind(data.pin_expiration)
    .bind(&data.role)
    .bind(data.role_id)
    .bind(&data.password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(msg) if msg.contains("user.pin") => {
            RepoError::Duplicate("PIN already in use".into())
        }
        RepoError::Duplicate(_) => RepoError::Duplicate("Username already exists".into()),
        other => other,
    })?;
    Ok(user)
}

pub async fn update_profile(
    db: impl SqliteExecutor<'_>,
    id: i64,
    changes: UserChanges,
) -> RepoResult<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE user SET username = COALESCE(?1, username), alias = COALESCE(?2, alias), \
         role = COALESCE(?3, role), role_id = COALESCE(?4, role_id), \
         password_hash = COALESCE(?5, password_hash), updated_at = ?6 \
         WHERE id = ?7 RETURNING {COLUMNS}"
    ))
    .bind(&changes.username)
    .bind(&changes.alias)
    .bind(&changes.role)
    .bind(changes.role_id)
    .bind(&changes.password_hash)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(db)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate("Username already exists".into()),
        other => other,
    })?;
    user.ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_settings(
    db: impl SqliteExecutor<'_>,
    id: i64,
    notifications: bool,
    dark_mode: bool,
) -> RepoResult<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE user SET notifications = ?, dark_mode = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(notifications)
    .bind(dark_mode)
    .bind(now_millis())
    .bind(id)
    .fetch_optional(db)
    .await?;
    user.ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn new_user(username: &str, pin: &str) -> NewUser {
        NewUser {
            username: Some(username.into()),
            pin: pin.into(),
            pin_expiration: now_millis() + 60_000,
            role: Some("waiter".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let pool = test_pool().await;
        assert_eq!(count(&pool).await.unwrap(), 0);

        let user = create(&pool, new_user("ana", "1111")).await.unwrap();
        assert_eq!(count(&pool).await.unwrap(), 1);
        assert!(user.notifications);

        let by_pin = find_by_pin(&pool, "1111").await.unwrap().unwrap();
        assert_eq!(by_pin.id, user.id);
        let by_name = find_by_username(&pool, "ana").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(find_by_pin(&pool, "9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_pin_and_username_are_rejected() {
        let pool = test_pool().await;
        create(&pool, new_user("ana", "1111")).await.unwrap();

        let err = create(&pool, new_user("bob", "1111")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref m) if m.contains("PIN")));

        let err = create(&pool, new_user("ana", "2222")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(ref m) if m.contains("Username")));
    }

    #[tokio::test]
    async fn profile_update_keeps_unset_fields() {
        let pool = test_pool().await;
        let user = create(&pool, new_user("ana", "1111")).await.unwrap();

        let updated = update_profile(
            &pool,
            user.id,
            UserChanges {
                alias: Some("Anita".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.alias.as_deref(), Some("Anita"));
        assert_eq!(updated.username.as_deref(), Some("ana"));
        assert_eq!(updated.role.as_deref(), Some("waiter"));

        let err = update_profile(&pool, 42, UserChanges::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn active_pins_exclude_expired() {
        let pool = test_pool().await;
        let mut expired = new_user("old", "0000");
        expired.pin_expiration = now_millis() - 1;
        create(&pool, expired).await.unwrap();
        create(&pool, new_user("ana", "1111")).await.unwrap();

        let active = find_with_active_pin(&pool, now_millis()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pin, "1111");
    }
}
