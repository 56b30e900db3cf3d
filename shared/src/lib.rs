//! Shared types for the restaurant POS
//!
//! Common types used by the server and its clients: error codes,
//! domain models and realtime event payloads.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{BusMessage, PosEvent};
