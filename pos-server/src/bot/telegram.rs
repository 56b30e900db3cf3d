//! Telegram Bot API over HTTPS long polling (no SDK dependency)

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum BotError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Where updates come from and replies go to
#[async_trait]
pub trait BotTransport: Send + Sync {
    /// Updates after `offset`, waiting up to `timeout_secs` for new ones
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotError>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError>;
}

#[derive(Debug, Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            // above the long-poll timeout
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{API_BASE}/bot{token}"),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, BotError> {
        let resp: ApiResponse<T> = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        match (resp.ok, resp.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::Api(
                resp.description
                    .unwrap_or_else(|| format!("{method} failed")),
            )),
        }
    }
}

#[async_trait]
impl BotTransport for TelegramApi {
    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, BotError> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": timeout_secs, "allowed_updates": ["message"] }),
        )
        .await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_decode_from_api_payload() {
        let raw = r#"{"ok":true,"result":[
            {"update_id":10,"message":{"message_id":1,"chat":{"id":42,"type":"private"},"text":"/pin 1234"}},
            {"update_id":11,"edited_message":{"message_id":1,"chat":{"id":42,"type":"private"}}}
        ]}"#;
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = resp.result.unwrap();
        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/pin 1234"));
        assert!(updates[1].message.is_none());
    }

    #[test]
    fn api_errors_keep_description() {
        let raw = r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#;
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
    }
}
