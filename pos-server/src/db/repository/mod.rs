//! Repository Module
//!
//! Free async functions over SQLite. Single-statement functions accept any
//! executor (`&SqlitePool` or `&mut *tx`); multi-statement functions take a
//! `&mut SqliteConnection` so callers decide the transaction boundary.

// Identity
pub mod bot_chat;
pub mod group;
pub mod permission;
pub mod role;
pub mod user;

// Tables
pub mod dining_table;
pub mod reservation;
pub mod section;
pub mod table_session;
pub mod virtual_table;

// Catalog
pub mod inventory;
pub mod menu_category;
pub mod menu_item;

// Orders
pub mod order;
pub mod payment_log;

// System
pub mod setting;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Database(format!("JSON column encoding failed: {err}"))
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Serialize a value for a JSON TEXT column
pub(crate) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> RepoResult<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_app_errors() {
        let err: AppError = RepoError::Duplicate("UNIQUE constraint failed: user.pin".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);

        let err: AppError = RepoError::Business(ErrorCode::UnpaidOrders, "unpaid".into()).into();
        assert_eq!(err.code, ErrorCode::UnpaidOrders);
        assert_eq!(err.message, "unpaid");

        let err: AppError = RepoError::Database("disk I/O".into()).into();
        assert_eq!(err.http_status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
