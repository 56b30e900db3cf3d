//! 消息总线消息类型定义
//!
//! 领域事件在 pos-server 内部通过消息总线传递，
//! 再以 Socket.IO 事件的形式广播给所有已连接的客户端。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use uuid::Uuid;

/// Domain events broadcast to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosEvent {
    #[serde(rename = "new-order")]
    NewOrder,
    #[serde(rename = "update-order")]
    UpdateOrder,
    #[serde(rename = "order-sent-to-cashier")]
    OrderSentToCashier,
    #[serde(rename = "orders-sent-to-cashier")]
    OrdersSentToCashier,
    #[serde(rename = "payment-completed")]
    PaymentCompleted,
    #[serde(rename = "tableCreated")]
    TableCreated,
    #[serde(rename = "tableUpdated")]
    TableUpdated,
    #[serde(rename = "tableDeleted")]
    TableDeleted,
    #[serde(rename = "tableStatusUpdated")]
    TableStatusUpdated,
    #[serde(rename = "sessionOpened")]
    SessionOpened,
    #[serde(rename = "sessionClosed")]
    SessionClosed,
    #[serde(rename = "virtualTableUpdated")]
    VirtualTableUpdated,
    #[serde(rename = "inventoryUpdated")]
    InventoryUpdated,
}

impl PosEvent {
    /// Socket.IO event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewOrder => "new-order",
            Self::UpdateOrder => "update-order",
            Self::OrderSentToCashier => "order-sent-to-cashier",
            Self::OrdersSentToCashier => "orders-sent-to-cashier",
            Self::PaymentCompleted => "payment-completed",
            Self::TableCreated => "tableCreated",
            Self::TableUpdated => "tableUpdated",
            Self::TableDeleted => "tableDeleted",
            Self::TableStatusUpdated => "tableStatusUpdated",
            Self::SessionOpened => "sessionOpened",
            Self::SessionClosed => "sessionClosed",
            Self::VirtualTableUpdated => "virtualTableUpdated",
            Self::InventoryUpdated => "inventoryUpdated",
        }
    }
}

impl fmt::Display for PosEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 消息总线消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event: PosEvent,
    pub payload: serde_json::Value,
    pub timestamp: i64,
}

impl BusMessage {
    pub fn new(event: PosEvent, payload: serde_json::Value) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event,
            payload,
            timestamp: crate::util::now_millis(),
        }
    }

    /// 序列化业务数据并创建消息
    pub fn from_data<T: Serialize>(event: PosEvent, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event, serde_json::to_value(data)?))
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_names_match_wire_names() {
        for event in [
            PosEvent::NewOrder,
            PosEvent::OrdersSentToCashier,
            PosEvent::TableStatusUpdated,
            PosEvent::VirtualTableUpdated,
        ] {
            let wire = serde_json::to_value(event).unwrap();
            assert_eq!(wire, json!(event.name()));
        }
    }

    #[test]
    fn bus_message_payload_roundtrip() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct TableRef {
            id: i64,
        }

        let msg = BusMessage::from_data(PosEvent::TableDeleted, &TableRef { id: 7 }).unwrap();
        assert_eq!(msg.event, PosEvent::TableDeleted);
        assert!(!msg.request_id.is_nil());
        let parsed: TableRef = msg.parse_payload().unwrap();
        assert_eq!(parsed, TableRef { id: 7 });
    }
}
