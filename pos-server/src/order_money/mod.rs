//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{OrderItem, PaymentMethodAmount};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}

/// Sum of `price * quantity` over the lines
pub fn order_total(items: &[OrderItem]) -> f64 {
    let total: Decimal = items
        .iter()
        .map(|item| to_decimal(item.price) * Decimal::from(item.quantity))
        .sum();
    to_f64(total)
}

/// Sum of monetary values
pub fn sum(values: impl IntoIterator<Item = f64>) -> f64 {
    to_f64(values.into_iter().map(to_decimal).sum())
}

/// Split one tip across orders proportionally to their totals
///
/// Each share is rounded to cents; the rounding remainder goes to the last
/// order so the shares always add up to `tip`. Zero totals put the whole tip
/// on the last order.
pub fn split_tip(tip: f64, totals: &[f64]) -> Vec<f64> {
    if totals.is_empty() {
        return Vec::new();
    }

    let tip = to_decimal(tip);
    let grand: Decimal = totals.iter().copied().map(to_decimal).sum();
    let mut shares = vec![Decimal::ZERO; totals.len()];

    if grand > Decimal::ZERO {
        for (share, total) in shares.iter_mut().zip(totals) {
            *share = (tip * to_decimal(*total) / grand)
                .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        }
    }

    let assigned: Decimal = shares.iter().sum();
    if let Some(last) = shares.last_mut() {
        *last += tip - assigned;
    }
    shares.into_iter().map(to_f64).collect()
}

/// Validate a payment amount (finite, positive, bounded)
pub fn validate_payment_amount(amount: f64) -> AppResult<()> {
    if !amount.is_finite() || amount <= 0.0 || amount > MAX_PAYMENT_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::InvalidPaymentAmount,
            format!("Invalid payment amount: {amount}"),
        ));
    }
    Ok(())
}

/// Resolve the method breakdown of a payment of `expected`
///
/// Without a breakdown the single method (or "cash") takes the whole amount;
/// a given breakdown must add up to `expected` within one cent.
pub fn resolve_methods(
    breakdown: &[PaymentMethodAmount],
    single: Option<&str>,
    expected: f64,
) -> AppResult<Vec<PaymentMethodAmount>> {
    if breakdown.is_empty() {
        return Ok(vec![PaymentMethodAmount {
            method: single.unwrap_or("cash").to_string(),
            amount: to_f64(to_decimal(expected)),
        }]);
    }

    let given = sum(breakdown.iter().map(|m| m.amount));
    if !money_eq(given, expected) {
        return Err(AppError::with_message(
            ErrorCode::PaymentMethodMismatch,
            format!("Payment methods add up to {given:.2}, expected {expected:.2}"),
        )
        .with_detail("expected", expected)
        .with_detail("given", given));
    }
    Ok(breakdown.to_vec())
}

#[cfg(test)]
mod tests;
