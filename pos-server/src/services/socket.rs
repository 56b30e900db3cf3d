//! Socket.IO 桥接
//!
//! 默认命名空间只做广播: 客户端连接后接收总线上的每个领域事件,
//! 事件名即 [`PosEvent::name`](shared::message::PosEvent::name)。

use async_trait::async_trait;
use serde_json::Value;
use socketioxide::SocketIo;
use socketioxide::extract::SocketRef;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::MessageBus;
use shared::util::now_millis;

/// Fan-out target of the forwarder
#[async_trait]
pub trait Broadcaster: Send + Sync + 'static {
    async fn broadcast(&self, event: &'static str, payload: &Value) -> Result<(), String>;
}

#[async_trait]
impl Broadcaster for SocketIo {
    async fn broadcast(&self, event: &'static str, payload: &Value) -> Result<(), String> {
        self.emit(event, payload).await.map_err(|e| e.to_string())
    }
}

/// Register the default namespace and track connected clients
pub fn register_namespace(io: &SocketIo, bus: &MessageBus) {
    let clients = bus.clients.clone();
    io.ns("/", move |socket: SocketRef| {
        let clients = clients.clone();
        async move {
            let sid = socket.id.to_string();
            tracing::debug!(sid = %sid, "Socket.IO client connected");
            clients.insert(sid, now_millis());

            socket.on_disconnect(move |socket: SocketRef| {
                let clients = clients.clone();
                async move {
                    let sid = socket.id.to_string();
                    clients.remove(&sid);
                    tracing::debug!(sid = %sid, "Socket.IO client disconnected");
                }
            });
        }
    });
}

/// Forward bus messages to `sink` until shutdown
pub fn spawn_forwarder<B: Broadcaster>(sink: B, bus: &MessageBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    let shutdown = bus.shutdown_token().clone();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(message) => {
                        if let Err(e) = sink.broadcast(message.event.name(), &message.payload).await {
                            tracing::warn!(event = %message.event, error = %e, "Socket.IO broadcast failed");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Socket.IO forwarder lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        tracing::debug!("Socket.IO forwarder stopped");
    })
}
