//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型 (from shared::error)
//! - [`ValidatedJson`] - 带校验的 JSON 提取器
//! - 日志等工具

pub mod extract;
pub mod logger;
pub mod validation;

pub use extract::ValidatedJson;
pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode};
