//! Domain event publishing
//!
//! Services receive an `Arc<dyn EventPublisher>` and publish after their
//! transaction commits. Delivery is fire-and-forget.

use std::fmt::Debug;

use serde::Serialize;
use shared::message::{BusMessage, PosEvent};

/// Sink for domain events
pub trait EventPublisher: Send + Sync + Debug {
    fn publish(&self, message: BusMessage);
}

/// Serialize `data` and publish it; serialization failures are only logged
pub fn emit<T: Serialize>(publisher: &dyn EventPublisher, event: PosEvent, data: &T) {
    match BusMessage::from_data(event, data) {
        Ok(message) => publisher.publish(message),
        Err(e) => tracing::warn!(%event, error = %e, "Failed to serialize event payload"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every published message for assertions
    #[derive(Debug, Default)]
    pub struct RecordingPublisher {
        messages: Mutex<Vec<BusMessage>>,
    }

    impl RecordingPublisher {
        pub fn events(&self) -> Vec<PosEvent> {
            self.messages.lock().unwrap().iter().map(|m| m.event).collect()
        }

        pub fn messages(&self) -> Vec<BusMessage> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, message: BusMessage) {
            self.messages.lock().unwrap().push(message);
        }
    }
}
