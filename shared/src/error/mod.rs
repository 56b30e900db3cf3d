//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error with code, message, and details
//! - [`ErrorBody`]: JSON body sent to clients
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::TableNotFound);
//! assert_eq!(err.http_status(), shared::http::StatusCode::NOT_FOUND);
//!
//! let err = AppError::validation("numberOfGuests must be positive")
//!     .with_detail("field", "numberOfGuests");
//! assert_eq!(err.code, ErrorCode::ValidationFailed);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
