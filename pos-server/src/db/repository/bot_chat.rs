//! Bot Chat Repository
//!
//! Telegram chats bound to a staff user through `/pin`.

use super::RepoResult;
use shared::util::now_millis;
use sqlx::SqliteExecutor;

/// Chat binding
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BotChat {
    pub chat_id: i64,
    pub user_id: i64,
    pub table_id: Option<i64>,
    pub session_id: Option<i64>,
    pub bound_at: i64,
    pub expires_at: i64,
}

/// Binding that has not expired at `now`
pub async fn find_active(
    db: impl SqliteExecutor<'_>,
    chat_id: i64,
    now: i64,
) -> RepoResult<Option<BotChat>> {
    let chat = sqlx::query_as::<_, BotChat>(
        "SELECT chat_id, user_id, table_id, session_id, bound_at, expires_at \
         FROM bot_chat WHERE chat_id = ? AND expires_at > ?",
    )
    .bind(chat_id)
    .bind(now)
    .fetch_optional(db)
    .await?;
    Ok(chat)
}

/// Bind (or rebind) a chat; any selected table is cleared
pub async fn bind(
    db: impl SqliteExecutor<'_>,
    chat_id: i64,
    user_id: i64,
    ttl_ms: i64,
) -> RepoResult<BotChat> {
    let now = now_millis();
    let chat = sqlx::query_as::<_, BotChat>(
        "INSERT INTO bot_chat (chat_id, user_id, table_id, session_id, bound_at, expires_at) \
         VALUES (?1, ?2, NULL, NULL, ?3, ?4) \
         ON CONFLICT(chat_id) DO UPDATE SET user_id = ?2, table_id = NULL, session_id = NULL, \
         bound_at = ?3, expires_at = ?4 \
         RETURNING chat_id, user_id, table_id, session_id, bound_at, expires_at",
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(now)
    .bind(now + ttl_ms)
    .fetch_one(db)
    .await?;
    Ok(chat)
}

pub async fn select_table(
    db: impl SqliteExecutor<'_>,
    chat_id: i64,
    table_id: i64,
    session_id: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE bot_chat SET table_id = ?, session_id = ? WHERE chat_id = ?")
        .bind(table_id)
        .bind(session_id)
        .bind(chat_id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::user::{self, NewUser};
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn binding_expires_and_rebind_clears_table() {
        let pool = test_pool().await;
        let waiter = user::create(
            &pool,
            NewUser {
                pin: "4321".into(),
                pin_expiration: now_millis() + 60_000,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        bind(&pool, 55, waiter.id, 60_000).await.unwrap();
        select_table(&pool, 55, 1, 2).await.unwrap();
        let chat = find_active(&pool, 55, now_millis()).await.unwrap().unwrap();
        assert_eq!(chat.table_id, Some(1));
        assert!(find_active(&pool, 55, now_millis() + 120_000).await.unwrap().is_none());

        let rebound = bind(&pool, 55, waiter.id, 60_000).await.unwrap();
        assert_eq!(rebound.table_id, None);
    }
}
