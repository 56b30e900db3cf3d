//! 目录模块 - 菜单配方与库存
//!
//! - [`units`] - 配方单位到库存单位的换算
//! - [`deduction`] - 下单时按配方扣减库存 (事务内条件更新)
//! - [`CatalogService`] - 菜单、分类、库存的增删改

pub mod deduction;
mod service;
pub mod units;

pub use deduction::{Requirement, deduct, requirements_for, restore};
pub use service::CatalogService;
pub use units::convert;
