//! Analytics - report aggregation
//!
//! Read-only views over orders and payment logs. Windows are inclusive Unix
//! millis; a missing start means "since the beginning", a missing end "now".

use std::collections::{HashMap, HashSet};

use shared::error::AppResult;
use shared::models::{
    DailySummary, DateRangeQuery, OrderQuery, PopularItem, PopularItems, SalesSummary, WaiterTips,
};
use shared::util::{day_start_millis, now_millis};
use sqlx::SqlitePool;

use crate::db::repository::{order, payment_log};
use crate::order_money;

fn window(range: &DateRangeQuery) -> (i64, i64) {
    (
        range.start_date.unwrap_or(0),
        range.end_date.unwrap_or_else(now_millis),
    )
}

/// Quantity sold per menu item over the paid orders of the window
///
/// Sorted by quantity, descending; ties keep first-sold order.
pub async fn popular_items(pool: &SqlitePool, range: DateRangeQuery) -> AppResult<PopularItems> {
    let (from, to) = window(&range);
    let orders = order::find_paid_between(pool, from, to).await?;

    let mut tally: Vec<PopularItem> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for line in orders.iter().flat_map(|o| &o.items) {
        match index.get(&line.menu_item_id) {
            Some(&i) => tally[i].quantity += i64::from(line.quantity),
            None => {
                index.insert(line.menu_item_id, tally.len());
                tally.push(PopularItem {
                    menu_item_id: line.menu_item_id,
                    name: line.name.clone(),
                    quantity: i64::from(line.quantity),
                });
            }
        }
    }
    // sort_by is stable
    tally.sort_by(|a, b| b.quantity.cmp(&a.quantity));

    Ok(PopularItems {
        popular_items: tally,
        total_orders: orders.len() as i64,
    })
}

/// Activity of the current UTC day
pub async fn daily_summary(pool: &SqlitePool) -> AppResult<DailySummary> {
    let now = now_millis();
    let query = OrderQuery {
        from: Some(day_start_millis(now)),
        to: Some(now),
        ..Default::default()
    };
    let orders = order::find_all(pool, &query).await?;

    let tables: HashSet<i64> = orders.iter().map(|o| o.table_id).collect();
    Ok(DailySummary {
        total_orders: orders.len() as i64,
        total_revenue: order_money::sum(orders.iter().filter(|o| o.paid).map(|o| o.total)),
        customers_served: tables.len() as i64,
    })
}

pub async fn sales_summary(pool: &SqlitePool, range: DateRangeQuery) -> AppResult<SalesSummary> {
    let (from, to) = window(&range);
    let logs = payment_log::find_between(pool, from, to).await?;
    let by_method = payment_log::totals_by_method(pool, from, to).await?;

    Ok(SalesSummary {
        payment_count: logs.len() as i64,
        order_count: logs.iter().map(|l| l.orders.len() as i64).sum(),
        total_sales: order_money::sum(logs.iter().map(|l| l.total)),
        total_tips: order_money::sum(logs.iter().map(|l| l.tip)),
        grand_total: order_money::sum(logs.iter().map(|l| l.grand_total)),
        by_method,
    })
}

pub async fn waiter_tips(pool: &SqlitePool, range: DateRangeQuery) -> AppResult<Vec<WaiterTips>> {
    let (from, to) = window(&range);
    Ok(payment_log::tips_by_waiter(pool, from, to).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::payment_log::NewPaymentLog;
    use crate::db::repository::user::{self, NewUser};
    use crate::db::test_support::test_pool;
    use shared::models::{
        Area, ItemStatus, Order, OrderItem, OrderSource, OrderStatus, PaymentMethodAmount,
    };

    fn line(menu_item_id: i64, name: &str, quantity: i32) -> OrderItem {
        OrderItem {
            id: menu_item_id,
            menu_item_id,
            name: name.into(),
            price: 2.0,
            quantity,
            status: ItemStatus::Delivered,
            area: Area::Kitchen,
            comments: vec![],
        }
    }

    async fn insert(pool: &SqlitePool, id: i64, table_id: i64, paid: bool, items: Vec<OrderItem>) {
        let total = order_money::order_total(&items);
        let now = now_millis();
        order::insert(
            pool,
            &Order {
                id,
                table_id,
                session_id: None,
                waiter_id: None,
                items,
                status: if paid { OrderStatus::Paid } else { OrderStatus::Ready },
                total,
                tip: 0.0,
                amount_paid: if paid { total } else { 0.0 },
                paid,
                payment_method: None,
                source: OrderSource::Pos,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();
    }

    fn methods(pairs: &[(&str, f64)]) -> Vec<PaymentMethodAmount> {
        pairs
            .iter()
            .map(|(method, amount)| PaymentMethodAmount {
                method: method.to_string(),
                amount: *amount,
            })
            .collect()
    }

    #[tokio::test]
    async fn popular_items_ties_keep_first_sold() {
        let pool = test_pool().await;
        insert(&pool, 1, 1, true, vec![line(10, "Tacos", 2), line(20, "Agua", 2)]).await;
        insert(&pool, 2, 2, true, vec![line(30, "Flan", 5)]).await;
        insert(&pool, 3, 3, false, vec![line(20, "Agua", 9)]).await;

        let popular = popular_items(&pool, DateRangeQuery::default()).await.unwrap();
        assert_eq!(popular.total_orders, 2);
        let names: Vec<_> = popular.popular_items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Flan", "Tacos", "Agua"]);

        let empty = popular_items(
            &pool,
            DateRangeQuery {
                start_date: Some(0),
                end_date: Some(1),
            },
        )
        .await
        .unwrap();
        assert!(empty.popular_items.is_empty());
        assert_eq!(empty.total_orders, 0);
    }

    #[tokio::test]
    async fn daily_summary_counts_today() {
        let pool = test_pool().await;
        insert(&pool, 1, 1, true, vec![line(10, "Tacos", 2)]).await;
        insert(&pool, 2, 1, false, vec![line(10, "Tacos", 1)]).await;
        insert(&pool, 3, 2, true, vec![line(20, "Agua", 1)]).await;

        let summary = daily_summary(&pool).await.unwrap();
        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.total_revenue, 6.0);
        assert_eq!(summary.customers_served, 2);
    }

    #[tokio::test]
    async fn sales_and_tips_come_from_payment_logs() {
        let pool = test_pool().await;
        let waiter = user::create(
            &pool,
            NewUser {
                username: Some("ana".into()),
                alias: Some("Ana".into()),
                pin: "1234".into(),
                pin_expiration: now_millis() + 60_000,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        payment_log::append(
            &pool,
            &NewPaymentLog {
                table_id: 1,
                orders: vec![1, 2],
                total: 30.0,
                tip: 3.0,
                grand_total: 33.0,
                payment_methods: methods(&[("cash", 20.0), ("card", 13.0)]),
                waiter_id: Some(waiter.id),
                is_partial: false,
            },
        )
        .await
        .unwrap();
        payment_log::append(
            &pool,
            &NewPaymentLog {
                table_id: 2,
                orders: vec![3],
                total: 10.0,
                tip: 1.5,
                grand_total: 11.5,
                payment_methods: methods(&[("cash", 11.5)]),
                waiter_id: Some(waiter.id),
                is_partial: false,
            },
        )
        .await
        .unwrap();

        let sales = sales_summary(&pool, DateRangeQuery::default()).await.unwrap();
        assert_eq!(sales.payment_count, 2);
        assert_eq!(sales.order_count, 3);
        assert_eq!(sales.total_sales, 40.0);
        assert_eq!(sales.total_tips, 4.5);
        assert_eq!(sales.grand_total, 44.5);
        assert_eq!(sales.by_method[0].method, "cash");
        assert_eq!(sales.by_method[0].amount, 31.5);

        let tips = waiter_tips(&pool, DateRangeQuery::default()).await.unwrap();
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].waiter_name.as_deref(), Some("Ana"));
        assert_eq!(tips[0].payment_count, 2);
        assert_eq!(tips[0].total_tips, 4.5);
    }
}
