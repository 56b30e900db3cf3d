use std::sync::Arc;

use shared::error::ErrorCode;
use shared::message::PosEvent;
use shared::models::{
    Area, DateRangeQuery, Ingredient, InventoryItemCreate, ItemStatus, MenuCategoryCreate,
    OrderCreate, OrderItemInput, OrderPaymentRequest, OrderSource, OrderStatus,
    PartialPaymentRequest, PaymentMethodAmount, TablePaymentRequest, Unit,
};
use sqlx::SqlitePool;

use super::OrderService;
use crate::db::repository::menu_item::MenuItemRow;
use crate::db::repository::table_session::NewSession;
use crate::db::repository::{inventory, menu_category, menu_item, payment_log, table_session};
use crate::db::DbService;
use crate::db::test_support::test_pool;
use crate::services::events::testing::RecordingPublisher;

const TABLE: i64 = 1;

struct Fixture {
    pool: SqlitePool,
    service: OrderService,
    events: Arc<RecordingPublisher>,
    /// 1000 g of beef
    beef_id: i64,
    /// 200 g of beef, kitchen
    tacos_id: i64,
    /// bar, no recipe
    soda_id: i64,
    session_id: i64,
}

async fn fixture() -> Fixture {
    fixture_with(test_pool().await).await
}

async fn fixture_with(pool: SqlitePool) -> Fixture {
    let events = Arc::new(RecordingPublisher::default());
    let service = OrderService::new(pool.clone(), events.clone());

    let kitchen = menu_category::create(
        &pool,
        &MenuCategoryCreate {
            name: "Platos".into(),
            description: None,
            area: Area::Kitchen,
        },
    )
    .await
    .unwrap();
    let bar = menu_category::create(
        &pool,
        &MenuCategoryCreate {
            name: "Bebidas".into(),
            description: None,
            area: Area::Bar,
        },
    )
    .await
    .unwrap();

    let beef = inventory::create(
        &pool,
        &InventoryItemCreate {
            name: "Carne".into(),
            quantity: 1000.0,
            unit: Unit::G,
            equivalent_ml: None,
            equivalent_gr: None,
            cost: None,
            tags: vec![],
            preparation_instructions: None,
        },
    )
    .await
    .unwrap();

    let tacos = menu_item::create(
        &pool,
        &MenuItemRow {
            name: "Tacos".into(),
            description: None,
            price: 12.5,
            category_id: kitchen.id,
            ingredients: vec![Ingredient {
                inventory_item_id: beef.id,
                quantity: 200.0,
                unit: Unit::G,
            }],
            comments: vec![],
        },
    )
    .await
    .unwrap();
    let soda = menu_item::create(
        &pool,
        &MenuItemRow {
            name: "Refresco".into(),
            description: None,
            price: 2.5,
            category_id: bar.id,
            ingredients: vec![],
            comments: vec![],
        },
    )
    .await
    .unwrap();

    let session = table_session::create(
        &pool,
        NewSession {
            table_id: TABLE,
            is_virtual: false,
            waiter_id: Some(9),
            number_of_guests: 2,
            comment: String::new(),
        },
    )
    .await
    .unwrap();

    Fixture {
        pool,
        service,
        events,
        beef_id: beef.id,
        tacos_id: tacos.id,
        soda_id: soda.id,
        session_id: session.id,
    }
}

fn line(item_id: i64, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        item_id,
        quantity,
        comments: vec![],
    }
}

fn create_request(lines: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate {
        table_id: TABLE,
        session_id: None,
        waiter_id: None,
        items: lines,
    }
}

async fn beef_left(f: &Fixture) -> f64 {
    inventory::find_by_id(&f.pool, f.beef_id)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

async fn ready_order(f: &Fixture, lines: Vec<OrderItemInput>) -> shared::models::Order {
    let order = f
        .service
        .create(create_request(lines), Some(9), OrderSource::Pos)
        .await
        .unwrap();
    let mut last = order.clone();
    for item in &order.items {
        last = f
            .service
            .update_item_status(order.id, item.id, ItemStatus::Ready)
            .await
            .unwrap();
    }
    last
}

#[tokio::test]
async fn create_deducts_stock_and_snapshots_lines() {
    let f = fixture().await;
    let order = f
        .service
        .create(
            create_request(vec![line(f.tacos_id, 1), line(f.soda_id, 2)]),
            Some(9),
            OrderSource::Pos,
        )
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.session_id, Some(f.session_id));
    assert_eq!(order.waiter_id, Some(9));
    assert_eq!(order.total, 17.5);
    assert_eq!(order.items[0].name, "Tacos");
    assert_eq!(order.items[0].area, Area::Kitchen);
    assert_eq!(order.items[1].area, Area::Bar);
    assert_eq!(beef_left(&f).await, 800.0);
    assert_eq!(f.events.events(), vec![PosEvent::NewOrder]);
}

#[tokio::test]
async fn shortage_rejects_the_whole_order() {
    let f = fixture().await;
    // 6 x 200 g > 1000 g
    let err = f
        .service
        .create(create_request(vec![line(f.tacos_id, 6)]), None, OrderSource::Pos)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert!(err.message.contains("Carne"));
    assert_eq!(beef_left(&f).await, 1000.0);
    assert!(f.service.list(Default::default()).await.unwrap().is_empty());
    assert!(f.events.events().is_empty());
}

#[tokio::test]
async fn lines_for_the_same_ingredient_are_summed() {
    let f = fixture().await;
    // 3 x 200 + 3 x 200 = 1200 g > 1000 g, although each line alone fits
    let err = f
        .service
        .create(
            create_request(vec![line(f.tacos_id, 3), line(f.tacos_id, 3)]),
            None,
            OrderSource::Pos,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(beef_left(&f).await, 1000.0);
}

#[tokio::test]
async fn order_requires_an_open_session() {
    let f = fixture().await;
    let mut request = create_request(vec![line(f.soda_id, 1)]);
    request.table_id = 2;
    let err = f.service.create(request, None, OrderSource::Pos).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::SessionNotFound);

    let err = f
        .service
        .create(create_request(vec![line(404, 1)]), None, OrderSource::Pos)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MenuItemNotFound);
}

#[tokio::test]
async fn status_is_the_least_advanced_line() {
    let f = fixture().await;
    let order = f
        .service
        .create(
            create_request(vec![line(f.tacos_id, 1), line(f.soda_id, 1)]),
            None,
            OrderSource::Pos,
        )
        .await
        .unwrap();

    let first = order.items[0].id;
    let updated = f
        .service
        .update_item_status(order.id, first, ItemStatus::Ready)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Preparing);

    // falls back to the menu item id
    let updated = f
        .service
        .update_item_status(order.id, f.soda_id, ItemStatus::Ready)
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Ready);

    let err = f
        .service
        .update_item_status(order.id, 404, ItemStatus::Ready)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderItemNotFound);
}

#[tokio::test]
async fn concurrent_line_updates_are_both_kept() {
    // file database: several pooled connections racing on one order
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("pos.db").display());
    let f = fixture_with(DbService::new(&url).await.unwrap().pool).await;

    let order = f
        .service
        .create(
            create_request(vec![line(f.tacos_id, 1), line(f.soda_id, 1)]),
            None,
            OrderSource::Pos,
        )
        .await
        .unwrap();
    let (a, b) = (order.items[0].id, order.items[1].id);

    let (first, second) = tokio::join!(
        f.service.update_item_status(order.id, a, ItemStatus::Ready),
        f.service.update_item_status(order.id, b, ItemStatus::Ready),
    );
    first.unwrap();
    second.unwrap();

    let stored = f.service.get(order.id).await.unwrap();
    assert!(stored.items.iter().all(|i| i.status == ItemStatus::Ready));
    assert_eq!(stored.status, OrderStatus::Ready);
}

#[tokio::test]
async fn replace_items_restores_then_deducts() {
    let f = fixture().await;
    let order = f
        .service
        .create(create_request(vec![line(f.tacos_id, 2)]), None, OrderSource::Pos)
        .await
        .unwrap();
    assert_eq!(beef_left(&f).await, 600.0);

    let updated = f
        .service
        .replace_items(order.id, vec![line(f.tacos_id, 4)])
        .await
        .unwrap();
    assert_eq!(updated.total, 50.0);
    assert_eq!(beef_left(&f).await, 200.0);

    // 6 tacos do not fit even after returning the 4 already taken
    let err = f
        .service
        .replace_items(order.id, vec![line(f.tacos_id, 6)])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(beef_left(&f).await, 200.0);

    f.service
        .update_item_status(order.id, f.tacos_id, ItemStatus::Ready)
        .await
        .unwrap();
    let err = f
        .service
        .replace_items(order.id, vec![line(f.tacos_id, 1)])
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotEditable);
}

#[tokio::test]
async fn pay_order_requires_ready_status() {
    let f = fixture().await;
    let order = f
        .service
        .create(create_request(vec![line(f.soda_id, 2)]), None, OrderSource::Pos)
        .await
        .unwrap();

    let request = OrderPaymentRequest {
        payment_method: Some("card".into()),
        amount: None,
        tip: 1.0,
        payment_methods: vec![],
    };
    let err = f
        .service
        .pay_order(order.id, request.clone(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotReady);

    f.service.send_to_cashier(order.id).await.unwrap();

    // 5.00 due
    let over = OrderPaymentRequest {
        amount: Some(7.0),
        ..request.clone()
    };
    let err = f.service.pay_order(order.id, over, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPaymentAmount);
    assert!(!f.service.get(order.id).await.unwrap().paid);

    let result = f.service.pay_order(order.id, request.clone(), Some(3)).await.unwrap();
    assert_eq!(result.total, 5.0);
    assert_eq!(result.grand_total, 6.0);
    assert_eq!(result.orders[0].status, OrderStatus::Paid);
    assert_eq!(result.payment_log.waiter_id, Some(3));
    assert_eq!(result.payment_log.payment_methods[0].method, "card");

    let err = f.service.pay_order(order.id, request, None).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderAlreadyPaid);
}

#[tokio::test]
async fn pay_table_splits_tip_and_logs_once() {
    let f = fixture().await;
    let a = ready_order(&f, vec![line(f.tacos_id, 2)]).await; // 25
    let b = ready_order(&f, vec![line(f.soda_id, 2)]).await; // 5
    // still preparing, not part of the payment
    f.service
        .create(create_request(vec![line(f.soda_id, 1)]), None, OrderSource::Pos)
        .await
        .unwrap();

    let payable = f.service.payable_for_table(TABLE).await.unwrap();
    assert_eq!(payable.len(), 2);

    let result = f
        .service
        .pay_table(
            TABLE,
            TablePaymentRequest {
                payment_method: None,
                tip: 3.0,
                payment_methods: vec![
                    PaymentMethodAmount {
                        method: "cash".into(),
                        amount: 20.0,
                    },
                    PaymentMethodAmount {
                        method: "card".into(),
                        amount: 13.0,
                    },
                ],
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(result.total, 30.0);
    assert_eq!(result.grand_total, 33.0);
    assert_eq!(result.payment_log.orders, vec![a.id, b.id]);
    assert_eq!(result.orders[0].tip, 2.5);
    assert_eq!(result.orders[1].tip, 0.5);
    assert!(result.orders.iter().all(|o| o.paid && o.payment_method.as_deref() == Some("mixed")));

    let err = f
        .service
        .pay_table(
            TABLE,
            TablePaymentRequest {
                payment_method: Some("cash".into()),
                tip: 0.0,
                payment_methods: vec![],
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NoOrdersForPayment);
    assert_eq!(err.http_status(), http::StatusCode::NOT_FOUND);

    let logs = payment_log::find_between(&f.pool, 0, i64::MAX).await.unwrap();
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn mismatched_breakdown_is_rejected() {
    let f = fixture().await;
    let order = ready_order(&f, vec![line(f.soda_id, 2)]).await;
    let err = f
        .service
        .pay_order(
            order.id,
            OrderPaymentRequest {
                payment_method: None,
                amount: None,
                tip: 0.0,
                payment_methods: vec![PaymentMethodAmount {
                    method: "cash".into(),
                    amount: 4.0,
                }],
            },
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentMethodMismatch);
    assert!(!f.service.get(order.id).await.unwrap().paid);
}

#[tokio::test]
async fn partial_payments_accumulate_until_paid() {
    let f = fixture().await;
    let order = f
        .service
        .create(create_request(vec![line(f.tacos_id, 2)]), None, OrderSource::Pos)
        .await
        .unwrap();

    let partial = |amount: f64| PartialPaymentRequest {
        amount,
        payment_method: "cash".into(),
        notes: None,
    };

    let first = f.service.partial_payment(order.id, partial(10.0), None).await.unwrap();
    assert_eq!(first.remaining, 15.0);
    assert_eq!(first.order.amount_paid, 10.0);
    assert!(!first.order.paid);
    assert!(first.payment_log.is_partial);

    let err = f
        .service
        .partial_payment(order.id, partial(20.0), None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPaymentAmount);

    let last = f.service.partial_payment(order.id, partial(15.0), None).await.unwrap();
    assert_eq!(last.remaining, 0.0);
    assert!(last.order.paid);
    assert_eq!(last.order.status, OrderStatus::Paid);

    let logs = payment_log::find_between(&f.pool, 0, i64::MAX).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().all(|l| l.grand_total == l.total + l.tip));
}

#[tokio::test]
async fn send_all_to_cashier_covers_unpaid_orders() {
    let f = fixture().await;
    f.service
        .create(create_request(vec![line(f.soda_id, 1)]), None, OrderSource::Pos)
        .await
        .unwrap();
    f.service
        .create(create_request(vec![line(f.tacos_id, 1)]), None, OrderSource::Pos)
        .await
        .unwrap();

    let sent = f.service.send_all_to_cashier(TABLE).await.unwrap();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|o| o.status == OrderStatus::SentToCashier));
    assert_eq!(f.events.events().last(), Some(&PosEvent::OrdersSentToCashier));
    assert_eq!(f.service.payable_for_table(TABLE).await.unwrap().len(), 2);
}

#[tokio::test]
async fn area_queue_only_holds_its_own_lines() {
    let f = fixture().await;
    let mixed = f
        .service
        .create(
            create_request(vec![line(f.tacos_id, 1), line(f.soda_id, 1)]),
            None,
            OrderSource::Pos,
        )
        .await
        .unwrap();

    let bar = f.service.for_area(Area::Bar).await.unwrap();
    assert_eq!(bar.len(), 1);
    assert_eq!(bar[0].items.len(), 1);
    assert_eq!(bar[0].items[0].name, "Refresco");

    f.service
        .update_item_status(mixed.id, f.soda_id, ItemStatus::Ready)
        .await
        .unwrap();
    f.service
        .update_item_status(mixed.id, f.tacos_id, ItemStatus::Ready)
        .await
        .unwrap();
    assert!(f.service.for_area(Area::Kitchen).await.unwrap().is_empty());
}

#[tokio::test]
async fn popular_items_count_paid_orders() {
    let f = fixture().await;
    let a = ready_order(&f, vec![line(f.soda_id, 3), line(f.tacos_id, 1)]).await;
    let b = ready_order(&f, vec![line(f.tacos_id, 1)]).await;
    for id in [a.id, b.id] {
        f.service
            .pay_order(
                id,
                OrderPaymentRequest {
                    payment_method: Some("cash".into()),
                    amount: None,
                    tip: 0.0,
                    payment_methods: vec![],
                },
                None,
            )
            .await
            .unwrap();
    }
    // unpaid, ignored
    f.service
        .create(create_request(vec![line(f.tacos_id, 1)]), None, OrderSource::Pos)
        .await
        .unwrap();

    let popular = f.service.popular(DateRangeQuery::default()).await.unwrap();
    assert_eq!(popular.total_orders, 2);
    assert_eq!(popular.popular_items[0].name, "Refresco");
    assert_eq!(popular.popular_items[0].quantity, 3);
    assert_eq!(popular.popular_items[1].quantity, 2);
}
