//! Order Model
//!
//! Line statuses advance `preparing → ready → sent to cashier → delivered`.
//! The order status is the least advanced status among its lines, or `paid`
//! once payment is complete.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::menu::Area;

/// Per-line preparation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "preparing")]
    Preparing,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "sent to cashier")]
    SentToCashier,
    #[serde(rename = "delivered")]
    Delivered,
}

impl ItemStatus {
    /// Position in the preparation flow
    pub fn rank(&self) -> u8 {
        match self {
            Self::Preparing => 0,
            Self::Ready => 1,
            Self::SentToCashier => 2,
            Self::Delivered => 3,
        }
    }
}

/// Aggregate order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum OrderStatus {
    #[serde(rename = "preparing")]
    #[cfg_attr(feature = "db", sqlx(rename = "preparing"))]
    Preparing,
    #[serde(rename = "ready")]
    #[cfg_attr(feature = "db", sqlx(rename = "ready"))]
    Ready,
    #[serde(rename = "sent to cashier")]
    #[cfg_attr(feature = "db", sqlx(rename = "sent to cashier"))]
    SentToCashier,
    #[serde(rename = "delivered")]
    #[cfg_attr(feature = "db", sqlx(rename = "delivered"))]
    Delivered,
    #[serde(rename = "paid")]
    #[cfg_attr(feature = "db", sqlx(rename = "paid"))]
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::SentToCashier => "sent to cashier",
            Self::Delivered => "delivered",
            Self::Paid => "paid",
        }
    }

    /// Statuses from which an order may be paid
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::Ready | Self::SentToCashier | Self::Delivered)
    }
}

impl From<ItemStatus> for OrderStatus {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Preparing => Self::Preparing,
            ItemStatus::Ready => Self::Ready,
            ItemStatus::SentToCashier => Self::SentToCashier,
            ItemStatus::Delivered => Self::Delivered,
        }
    }
}

/// Channel an order came in through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderSource {
    Pos,
    Telegram,
}

/// Order line with a name/price snapshot taken at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Line id, unique within the order
    pub id: i64,
    #[serde(rename = "itemId")]
    pub menu_item_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub status: ItemStatus,
    pub area: Area,
    #[serde(default)]
    pub comments: Vec<String>,
}

/// Order entity (订单)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub table_id: i64,
    pub session_id: Option<i64>,
    pub waiter_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total: f64,
    pub tip: f64,
    /// Sum of partial payments recorded so far
    pub amount_paid: f64,
    pub paid: bool,
    pub payment_method: Option<String>,
    pub source: OrderSource,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Status derived from the lines (never `paid`)
    pub fn aggregate_status(items: &[OrderItem]) -> OrderStatus {
        items
            .iter()
            .map(|i| i.status)
            .min_by_key(|s| s.rank())
            .map(OrderStatus::from)
            .unwrap_or(OrderStatus::Preparing)
    }

    /// Finds a line by line id, falling back to the menu item id
    pub fn find_item_mut(&mut self, item_id: i64) -> Option<&mut OrderItem> {
        let idx = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .or_else(|| self.items.iter().position(|i| i.menu_item_id == item_id))?;
        self.items.get_mut(idx)
    }

    pub fn has_area(&self, area: Area) -> bool {
        self.items.iter().any(|i| i.area == area)
    }
}

/// Requested order line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[serde(alias = "menuItemId")]
    pub item_id: i64,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: i32,
    #[serde(default)]
    pub comments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub table_id: i64,
    /// Resolved from the table's open session when absent
    #[serde(alias = "tableSessionId")]
    pub session_id: Option<i64>,
    pub waiter_id: Option<i64>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemInput>,
}

/// Replaces the lines of an order still in preparation
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemsUpdate {
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatusUpdate {
    pub status: ItemStatus,
}

/// List filters; `from`/`to` are Unix millis on `createdAt`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub area: Option<Area>,
    pub paid: Option<bool>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaQuery {
    pub area: Area,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    #[serde(rename = "itemId")]
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItems {
    pub popular_items: Vec<PopularItem>,
    pub total_orders: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: i64, status: ItemStatus) -> OrderItem {
        OrderItem {
            id,
            menu_item_id: id * 10,
            name: format!("item-{id}"),
            price: 5.0,
            quantity: 1,
            status,
            area: Area::Kitchen,
            comments: vec![],
        }
    }

    #[test]
    fn aggregate_is_ready_only_when_every_line_is_ready() {
        let items = vec![line(1, ItemStatus::Ready), line(2, ItemStatus::Preparing)];
        assert_eq!(Order::aggregate_status(&items), OrderStatus::Preparing);

        let items = vec![line(1, ItemStatus::Ready), line(2, ItemStatus::Ready)];
        assert_eq!(Order::aggregate_status(&items), OrderStatus::Ready);
    }

    #[test]
    fn aggregate_takes_least_advanced_line() {
        let items = vec![line(1, ItemStatus::Delivered), line(2, ItemStatus::SentToCashier)];
        assert_eq!(Order::aggregate_status(&items), OrderStatus::SentToCashier);

        let items = vec![line(1, ItemStatus::Delivered), line(2, ItemStatus::Ready)];
        assert_eq!(Order::aggregate_status(&items), OrderStatus::Ready);

        assert_eq!(Order::aggregate_status(&[]), OrderStatus::Preparing);
    }

    #[test]
    fn item_status_uses_spaced_wire_name() {
        let json = serde_json::to_string(&ItemStatus::SentToCashier).unwrap();
        assert_eq!(json, "\"sent to cashier\"");
        let status: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(status, OrderStatus::Paid);
        assert!(OrderStatus::Delivered.is_payable());
        assert!(!OrderStatus::Preparing.is_payable());
        assert!(!OrderStatus::Paid.is_payable());
    }

    #[test]
    fn order_create_accepts_legacy_field_names() {
        let json = r#"{"tableId": 7, "tableSessionId": 9, "items": [{"itemId": 3, "quantity": 2}]}"#;
        let req: OrderCreate = serde_json::from_str(json).unwrap();
        assert_eq!(req.session_id, Some(9));
        assert_eq!(req.items[0].item_id, 3);
        assert!(req.validate().is_ok());

        let empty = OrderCreate { items: vec![], ..req };
        assert!(empty.validate().is_err());
    }
}
