//! Telegram 点餐机器人
//!
//! 长轮询拉取消息, 每条消息交给 [`BotHandler`] 处理后回复同一会话。
//! 订单走与 POS 相同的下单路径 (扣库存、广播事件)。

mod handler;
pub mod parser;
mod telegram;

pub use handler::{BINDING_TTL_MS, BotHandler, INSTRUCTIONS};
pub use telegram::{BotError, BotTransport, Chat, Message, TelegramApi, Update};

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

const POLL_TIMEOUT_SECS: u64 = 30;
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Poll until `shutdown` fires
pub async fn run_polling(
    transport: Arc<dyn BotTransport>,
    handler: BotHandler,
    shutdown: CancellationToken,
) {
    tracing::info!("Telegram bot polling started");
    let mut offset = 0;
    let mut backoff = Duration::from_secs(1);

    loop {
        let updates = tokio::select! {
            _ = shutdown.cancelled() => break,
            result = transport.get_updates(offset, POLL_TIMEOUT_SECS) => result,
        };

        let updates = match updates {
            Ok(updates) => {
                backoff = Duration::from_secs(1);
                updates
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?backoff, "Telegram polling failed");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let Some(Message { chat, text: Some(text) }) = update.message else {
                continue;
            };
            let reply = handler.handle(chat.id, &text).await;
            if let Err(e) = transport.send_message(chat.id, &reply).await {
                tracing::warn!(chat_id = chat.id, error = %e, "Telegram reply failed");
            }
        }
    }
    tracing::info!("Telegram bot polling stopped");
}
