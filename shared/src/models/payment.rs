//! Payment Log Model
//!
//! Payment logs are append-only. `grand_total` is always `total + tip`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::order::Order;

/// One tender in a payment breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PaymentMethodAmount {
    #[validate(length(min = 1, max = 50))]
    pub method: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
}

/// Payment log entity (支付记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PaymentLog {
    pub id: i64,
    pub table_id: i64,
    /// Paid order ids
    #[cfg_attr(feature = "db", sqlx(json))]
    pub orders: Vec<i64>,
    pub total: f64,
    pub tip: f64,
    pub grand_total: f64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub payment_methods: Vec<PaymentMethodAmount>,
    pub waiter_id: Option<i64>,
    pub is_partial: bool,
    pub timestamp: i64,
}

/// Pay every payable order of a table
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TablePaymentRequest {
    #[validate(length(min = 1, max = 50))]
    pub payment_method: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub tip: f64,
    #[serde(default)]
    #[validate(nested)]
    pub payment_methods: Vec<PaymentMethodAmount>,
}

/// Pay a single order
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderPaymentRequest {
    #[validate(length(min = 1, max = 50))]
    pub payment_method: Option<String>,
    /// Defaults to the order total
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub tip: f64,
    #[serde(default)]
    #[validate(nested)]
    pub payment_methods: Vec<PaymentMethodAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PartialPaymentRequest {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Response of table and single-order payments
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub message: String,
    pub total: f64,
    pub tip: f64,
    pub grand_total: f64,
    pub orders: Vec<Order>,
    pub payment_log: PaymentLog,
}

/// Response of a partial payment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPaymentResult {
    pub order: Order,
    /// Amount still owed after this payment
    pub remaining: f64,
    pub payment_log: PaymentLog,
}
