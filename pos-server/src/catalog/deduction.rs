//! Recipe Deduction
//!
//! Every ingredient requirement of an order is summed per inventory item and
//! applied as a conditional decrement inside the caller's transaction. One
//! failed decrement fails the whole order; the caller drops the transaction
//! and nothing is persisted.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::MenuItem;
use sqlx::SqliteConnection;

use super::units;
use crate::db::repository::inventory;

/// Stock needed from one inventory item, in its own unit
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub inventory_item_id: i64,
    pub name: String,
    pub amount: f64,
}

fn round_amount(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Resolve the stock requirements of `(menu item, quantity)` lines
///
/// Fails when an ingredient references a missing inventory item or a unit
/// that cannot be converted into the stock unit.
pub async fn requirements_for(
    conn: &mut SqliteConnection,
    lines: &[(&MenuItem, i32)],
) -> AppResult<Vec<Requirement>> {
    let mut requirements: Vec<Requirement> = Vec::new();

    for (menu_item, quantity) in lines {
        for ingredient in &menu_item.ingredients {
            let stock = inventory::find_by_id(&mut *conn, ingredient.inventory_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::InventoryItemNotFound,
                        format!(
                            "Ingredient {} of '{}' not found",
                            ingredient.inventory_item_id, menu_item.name
                        ),
                    )
                })?;

            let per_portion = units::convert(ingredient.quantity, ingredient.unit, &stock)
                .ok_or_else(|| incompatible(ingredient.unit.as_str(), &stock.name, stock.unit.as_str()))?;
            let amount = per_portion * f64::from(*quantity);

            match requirements
                .iter_mut()
                .find(|r| r.inventory_item_id == stock.id)
            {
                Some(existing) => existing.amount = round_amount(existing.amount + amount),
                None => requirements.push(Requirement {
                    inventory_item_id: stock.id,
                    name: stock.name,
                    amount: round_amount(amount),
                }),
            }
        }
    }

    Ok(requirements)
}

pub(crate) fn incompatible(from: &str, name: &str, to: &str) -> AppError {
    AppError::with_message(
        ErrorCode::IncompatibleUnits,
        format!("incompatible units: cannot convert {from} into {to} for '{name}'"),
    )
}

/// Apply every requirement or fail on the first ingredient that runs short
pub async fn deduct(conn: &mut SqliteConnection, requirements: &[Requirement]) -> AppResult<()> {
    for req in requirements {
        if !inventory::try_decrement(&mut *conn, req.inventory_item_id, req.amount).await? {
            tracing::info!(
                inventory_item_id = req.inventory_item_id,
                required = req.amount,
                "Insufficient stock for {}",
                req.name
            );
            return Err(AppError::insufficient_stock(&req.name));
        }
    }
    Ok(())
}

/// Give stock back; items deleted in the meantime are skipped
pub async fn restore(conn: &mut SqliteConnection, requirements: &[Requirement]) -> AppResult<()> {
    for req in requirements {
        if inventory::find_by_id(&mut *conn, req.inventory_item_id).await?.is_none() {
            tracing::warn!(
                inventory_item_id = req.inventory_item_id,
                "Skipping stock restore for deleted inventory item"
            );
            continue;
        }
        inventory::increment(&mut *conn, req.inventory_item_id, req.amount).await?;
    }
    Ok(())
}
