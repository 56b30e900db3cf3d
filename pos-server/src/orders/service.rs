//! Order Service - creation, line edits, status and queries

use std::sync::Arc;

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::PosEvent;
use shared::models::{
    Area, DateRangeQuery, ItemStatus, MenuItem, Order, OrderCreate, OrderItem, OrderItemInput,
    OrderQuery, OrderSource, OrderStatus, PopularItems, SessionStatus,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use crate::catalog::{deduct, requirements_for, restore};
use crate::db::repository::{RepoError, menu_item, order, table_session};
use crate::order_money;
use crate::services::{EventPublisher, emit};

/// Order operations; every multi-step change runs in one transaction and
/// events are published after commit
#[derive(Clone, Debug)]
pub struct OrderService {
    pub(super) pool: SqlitePool,
    pub(super) events: Arc<dyn EventPublisher>,
}

impl OrderService {
    pub fn new(pool: SqlitePool, events: Arc<dyn EventPublisher>) -> Self {
        Self { pool, events }
    }

    /// Write transaction; `BEGIN IMMEDIATE` takes the write lock up front so
    /// concurrent read-modify-write cycles on one order queue behind each other
    pub(super) async fn begin(&self) -> AppResult<sqlx::Transaction<'static, sqlx::Sqlite>> {
        self.pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| RepoError::from(e).into())
    }

    // =========================================================================
    // Create / edit
    // =========================================================================

    /// Place an order against the table's open session
    ///
    /// Ingredient deduction and the insert commit together; a shortage on any
    /// ingredient leaves stock untouched.
    pub async fn create(
        &self,
        data: OrderCreate,
        waiter_id: Option<i64>,
        source: OrderSource,
    ) -> AppResult<Order> {
        let mut tx = self.begin().await?;

        let session_id = resolve_session(&mut tx, data.table_id, data.session_id).await?;
        let items = build_lines(&mut tx, &data.items).await?;

        let now = now_millis();
        let new_order = Order {
            id: snowflake_id(),
            table_id: data.table_id,
            session_id: Some(session_id),
            waiter_id: data.waiter_id.or(waiter_id),
            total: order_money::order_total(&items),
            items,
            status: OrderStatus::Preparing,
            tip: 0.0,
            amount_paid: 0.0,
            paid: false,
            payment_method: None,
            source,
            created_at: now,
            updated_at: now,
        };
        let created = order::insert(&mut *tx, &new_order).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            order_id = created.id,
            table_id = created.table_id,
            total = created.total,
            source = ?created.source,
            "Order created"
        );
        emit(&*self.events, PosEvent::NewOrder, &created);
        Ok(created)
    }

    /// Replace the lines of an order still entirely in preparation
    ///
    /// Stock of the old lines is returned and the new lines deducted in the
    /// same transaction.
    pub async fn replace_items(&self, id: i64, lines: Vec<OrderItemInput>) -> AppResult<Order> {
        let mut tx = self.begin().await?;

        let mut current = order::get(&mut *tx, id).await?;
        ensure_unpaid(&current)?;
        if current
            .items
            .iter()
            .any(|item| item.status != ItemStatus::Preparing)
        {
            return Err(AppError::with_message(
                ErrorCode::OrderNotEditable,
                "Only orders whose items are all still preparing can be edited",
            ));
        }

        // return what the old lines consumed, by their current recipes
        let mut old_recipes: Vec<(MenuItem, i32)> = Vec::new();
        for line in &current.items {
            match menu_item::find_by_id(&mut *tx, line.menu_item_id).await? {
                Some(menu) => old_recipes.push((menu, line.quantity)),
                None => tracing::warn!(
                    order_id = id,
                    menu_item_id = line.menu_item_id,
                    "Menu item gone, its stock is not restored"
                ),
            }
        }
        let old_lines: Vec<(&MenuItem, i32)> = old_recipes.iter().map(|(m, q)| (m, *q)).collect();
        let returned = requirements_for(&mut tx, &old_lines).await?;
        restore(&mut tx, &returned).await?;

        current.items = build_lines(&mut tx, &lines).await?;
        current.total = order_money::order_total(&current.items);
        current.status = OrderStatus::Preparing;
        current.updated_at = now_millis();
        let saved = order::save_unpaid(&mut *tx, &current).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(order_id = id, total = saved.total, "Order items replaced");
        emit(&*self.events, PosEvent::UpdateOrder, &saved);
        Ok(saved)
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Set one line's status and recompute the order status
    pub async fn update_item_status(
        &self,
        order_id: i64,
        item_id: i64,
        status: ItemStatus,
    ) -> AppResult<Order> {
        let mut tx = self.begin().await?;
        let mut current = order::get(&mut *tx, order_id).await?;
        ensure_unpaid(&current)?;

        let line = current.find_item_mut(item_id).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderItemNotFound,
                format!("Item {item_id} not found in order {order_id}"),
            )
        })?;
        line.status = status;
        current.status = Order::aggregate_status(&current.items);
        current.updated_at = now_millis();

        let saved = order::save_unpaid(&mut *tx, &current).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::debug!(order_id, item_id, status = ?saved.status, "Order item status updated");
        emit(&*self.events, PosEvent::UpdateOrder, &saved);
        Ok(saved)
    }

    /// Hand one order over to the cashier
    pub async fn send_to_cashier(&self, id: i64) -> AppResult<Order> {
        let mut tx = self.begin().await?;
        let mut current = order::get(&mut *tx, id).await?;
        ensure_unpaid(&current)?;
        mark_sent_to_cashier(&mut current);

        let saved = order::save_unpaid(&mut *tx, &current).await?;
        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(order_id = id, table_id = saved.table_id, "Order sent to cashier");
        emit(&*self.events, PosEvent::OrderSentToCashier, &saved);
        Ok(saved)
    }

    /// Hand every unpaid order of a table over to the cashier
    pub async fn send_all_to_cashier(&self, table_id: i64) -> AppResult<Vec<Order>> {
        let mut tx = self.begin().await?;
        let mut sent = Vec::new();
        for mut current in order::find_unpaid_for_table(&mut *tx, table_id).await? {
            mark_sent_to_cashier(&mut current);
            sent.push(order::save_unpaid(&mut *tx, &current).await?);
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(table_id, count = sent.len(), "Orders sent to cashier");
        emit(
            &*self.events,
            PosEvent::OrdersSentToCashier,
            &json!({ "tableId": table_id, "orders": sent }),
        );
        Ok(sent)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn list(&self, query: OrderQuery) -> AppResult<Vec<Order>> {
        Ok(order::find_all(&self.pool, &query).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Order> {
        Ok(order::get(&self.pool, id).await?)
    }

    /// Unpaid orders of a table that can be paid now
    pub async fn payable_for_table(&self, table_id: i64) -> AppResult<Vec<Order>> {
        Ok(order::find_payable_for_table(&self.pool, table_id).await?)
    }

    /// Work queue of a preparation area, reduced to the area's own lines
    pub async fn for_area(&self, area: Area) -> AppResult<Vec<Order>> {
        let mut orders = order::find_for_area(&self.pool, area).await?;
        for o in &mut orders {
            o.items.retain(|item| item.area == area);
        }
        Ok(orders)
    }

    pub async fn popular(&self, range: DateRangeQuery) -> AppResult<PopularItems> {
        crate::analytics::popular_items(&self.pool, range).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

pub(super) fn ensure_unpaid(order: &Order) -> AppResult<()> {
    if order.paid {
        return Err(AppError::with_message(
            ErrorCode::OrderAlreadyPaid,
            format!("Order {} is already paid", order.id),
        ));
    }
    Ok(())
}

fn mark_sent_to_cashier(order: &mut Order) {
    for item in &mut order.items {
        item.status = ItemStatus::SentToCashier;
    }
    order.status = OrderStatus::SentToCashier;
    order.updated_at = now_millis();
}

/// The open session an order belongs to
async fn resolve_session(
    conn: &mut SqliteConnection,
    table_id: i64,
    session_id: Option<i64>,
) -> AppResult<i64> {
    let session = match session_id {
        Some(id) => table_session::find_by_id(&mut *conn, id)
            .await?
            .filter(|s| s.table_id == table_id),
        None => table_session::find_open_for_table(&mut *conn, table_id).await?,
    };

    match session {
        Some(s) if s.status == SessionStatus::Open => Ok(s.id),
        Some(_) => Err(AppError::with_message(
            ErrorCode::SessionClosed,
            "The table session is no longer open",
        )),
        None => Err(AppError::with_message(
            ErrorCode::SessionNotFound,
            format!("No open session for table {table_id}"),
        )),
    }
}

/// Resolve lines to menu items, deduct their ingredients and snapshot them
async fn build_lines(
    conn: &mut SqliteConnection,
    inputs: &[OrderItemInput],
) -> AppResult<Vec<OrderItem>> {
    let mut routed = Vec::with_capacity(inputs.len());
    for input in inputs {
        routed.push(menu_item::find_routed(&mut *conn, input.item_id).await?);
    }

    let lines: Vec<(&MenuItem, i32)> = routed
        .iter()
        .zip(inputs)
        .map(|(r, input)| (&r.item, input.quantity))
        .collect();
    let requirements = requirements_for(&mut *conn, &lines).await?;
    deduct(&mut *conn, &requirements).await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(inputs.len());
    for (r, input) in routed.into_iter().zip(inputs) {
        let mut line_id = snowflake_id();
        while items.iter().any(|i| i.id == line_id) {
            line_id = snowflake_id();
        }
        items.push(OrderItem {
            id: line_id,
            menu_item_id: r.item.id,
            name: r.item.name,
            price: r.item.price,
            quantity: input.quantity,
            status: ItemStatus::Preparing,
            area: r.area,
            comments: input.comments.clone(),
        });
    }
    Ok(items)
}
