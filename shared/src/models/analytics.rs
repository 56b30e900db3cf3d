//! Analytics read models

use serde::{Deserialize, Serialize};

/// Today's activity (UTC day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_orders: i64,
    pub total_revenue: f64,
    /// Distinct tables with an order today
    pub customers_served: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MethodTotal {
    pub method: String,
    pub amount: f64,
}

/// Totals over the payment logs in a date window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub payment_count: i64,
    pub order_count: i64,
    pub total_sales: f64,
    pub total_tips: f64,
    pub grand_total: f64,
    pub by_method: Vec<MethodTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct WaiterTips {
    pub waiter_id: Option<i64>,
    pub waiter_name: Option<String>,
    pub payment_count: i64,
    pub total_tips: f64,
}
