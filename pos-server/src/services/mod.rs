//! 服务模块
//!
//! - [`MessageBus`] - 进程内广播总线
//! - [`EventPublisher`] - 注入到业务服务的事件发布接口
//! - [`socket`] - 总线到 Socket.IO 的桥接

pub mod events;
pub mod message_bus;
pub mod socket;

pub use events::{EventPublisher, emit};
pub use message_bus::MessageBus;
