//! 消息总线
//!
//! ```text
//! OrderService ─┐
//! TableService ─┼─▶ publish() ──▶ broadcast::Sender<BusMessage> ──▶ Socket.IO bridge
//! ...          ─┘
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::BusMessage;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::events::EventPublisher;

const DEFAULT_CAPACITY: usize = 1024;

/// 消息总线 - 负责领域事件广播
///
/// 发布是非阻塞的: 没有订阅者或订阅者落后时消息直接丢弃。
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
    /// 已连接的 Socket.IO 客户端 (sid -> 连接时间)
    pub(crate) clients: Arc<DashMap<String, i64>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
            clients: Arc::new(DashMap::new()),
        }
    }

    /// 订阅所有广播
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub fn connected_clients(&self) -> usize {
        self.clients.len()
    }

    /// 优雅关闭: 通知所有后台任务退出
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for MessageBus {
    fn publish(&self, message: BusMessage) {
        let event = message.event;
        match self.tx.send(message) {
            Ok(receivers) => tracing::debug!(%event, receivers, "Event published"),
            // no subscribers right now
            Err(_) => tracing::trace!(%event, "Event dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::message::PosEvent;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe();

        bus.publish(BusMessage::new(PosEvent::TableCreated, json!({"id": 1})));

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.event, PosEvent::TableCreated);
        assert_eq!(msg.payload["id"], 1);
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let bus = MessageBus::with_capacity(4);
        bus.publish(BusMessage::new(PosEvent::NewOrder, json!(null)));
        assert_eq!(bus.connected_clients(), 0);
    }
}
