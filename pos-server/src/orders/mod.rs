//! 订单模块
//!
//! # 订单生命周期
//!
//! ```text
//! create ──▶ preparing ──▶ ready ──▶ sent to cashier ──▶ delivered
//!                              │              │               │
//!                              └──────────────┴───────────────┴──▶ paid
//! ```
//!
//! - 下单与库存扣减在同一事务内完成
//! - 订单状态由各行状态聚合得出 (取最落后的一行)
//! - 结账支持单笔、整桌、部分付款, 每次付款写入不可变的付款日志

mod payment;
mod service;

pub use service::OrderService;

#[cfg(test)]
mod tests;
