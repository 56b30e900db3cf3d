//! 用户与身份
//!
//! 密码/PIN 登录、首个管理员引导、PIN 用户生成、个人资料，
//! 以及角色、权限、分组管理。

mod service;

pub use service::{PIN_USER_TTL_MS, UserService};
