//! Order Payments - single order, whole table, partial
//!
//! 每次付款都写一条付款日志, `grand_total = total + tip`。

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::PosEvent;
use shared::models::{
    Order, OrderPaymentRequest, OrderStatus, PartialPaymentRequest, PartialPaymentResult,
    PaymentLog, PaymentMethodAmount, PaymentResult, TablePaymentRequest,
};
use shared::util::now_millis;

use super::OrderService;
use super::service::ensure_unpaid;
use crate::db::repository::payment_log::{self, NewPaymentLog};
use crate::db::repository::{RepoError, order};
use crate::order_money::{self, money_eq, to_decimal, to_f64};
use crate::services::emit;

fn validate_tip(tip: f64) -> AppResult<()> {
    if !tip.is_finite() || tip < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidPaymentAmount,
            format!("Invalid tip: {tip}"),
        ));
    }
    Ok(())
}

/// Still owed on an order
fn remaining(order: &Order) -> f64 {
    to_f64((to_decimal(order.total) - to_decimal(order.amount_paid)).max(rust_decimal::Decimal::ZERO))
}

/// Method label stored on the order
fn method_label(methods: &[PaymentMethodAmount]) -> String {
    match methods {
        [single] => single.method.clone(),
        _ => "mixed".to_string(),
    }
}

fn settle(order: &mut Order, tip_share: f64, method: &str) {
    order.tip = to_f64(to_decimal(order.tip) + to_decimal(tip_share));
    order.amount_paid = order.total;
    order.paid = true;
    order.status = OrderStatus::Paid;
    order.payment_method = Some(method.to_string());
    order.updated_at = now_millis();
}

impl OrderService {
    /// Pay the outstanding amount of one ready order
    pub async fn pay_order(
        &self,
        id: i64,
        request: OrderPaymentRequest,
        waiter_id: Option<i64>,
    ) -> AppResult<PaymentResult> {
        validate_tip(request.tip)?;
        let mut tx = self.begin().await?;

        let mut current = order::get(&mut *tx, id).await?;
        ensure_unpaid(&current)?;
        if !current.status.is_payable() {
            return Err(AppError::with_message(
                ErrorCode::OrderNotReady,
                format!("Order {id} is {} and cannot be paid yet", current.status.as_str()),
            ));
        }

        let due = remaining(&current);
        if let Some(amount) = request.amount
            && !money_eq(amount, due)
        {
            let message = if amount < due {
                format!("Amount {amount:.2} does not cover the {due:.2} due; use a partial payment")
            } else {
                format!("Amount {amount:.2} exceeds the {due:.2} due")
            };
            return Err(AppError::with_message(ErrorCode::InvalidPaymentAmount, message)
                .with_detail("remaining", due));
        }

        let grand_total = order_money::sum([due, request.tip]);
        let methods = order_money::resolve_methods(
            &request.payment_methods,
            request.payment_method.as_deref(),
            grand_total,
        )?;

        settle(&mut current, request.tip, &method_label(&methods));
        let saved = order::save_unpaid(&mut *tx, &current).await?;
        let log = payment_log::append(
            &mut *tx,
            &NewPaymentLog {
                table_id: saved.table_id,
                orders: vec![saved.id],
                total: due,
                tip: request.tip,
                grand_total,
                payment_methods: methods,
                waiter_id: waiter_id.or(saved.waiter_id),
                is_partial: false,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(order_id = id, total = due, tip = request.tip, "Order paid");
        Ok(self.completed("Order paid", vec![saved], log))
    }

    /// Pay every payable order of a table with one tip split across them
    pub async fn pay_table(
        &self,
        table_id: i64,
        request: TablePaymentRequest,
        waiter_id: Option<i64>,
    ) -> AppResult<PaymentResult> {
        validate_tip(request.tip)?;
        let mut tx = self.begin().await?;

        let payable = order::find_payable_for_table(&mut *tx, table_id).await?;
        if payable.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::NoOrdersForPayment,
                format!("No orders ready for payment on table {table_id}"),
            ));
        }

        let dues: Vec<f64> = payable.iter().map(remaining).collect();
        let total = order_money::sum(dues.iter().copied());
        let grand_total = order_money::sum([total, request.tip]);
        let methods = order_money::resolve_methods(
            &request.payment_methods,
            request.payment_method.as_deref(),
            grand_total,
        )?;
        let label = method_label(&methods);
        let shares = order_money::split_tip(request.tip, &dues);

        let mut paid = Vec::with_capacity(payable.len());
        for (mut current, share) in payable.into_iter().zip(shares) {
            settle(&mut current, share, &label);
            paid.push(order::save_unpaid(&mut *tx, &current).await?);
        }

        let log = payment_log::append(
            &mut *tx,
            &NewPaymentLog {
                table_id,
                orders: paid.iter().map(|o| o.id).collect(),
                total,
                tip: request.tip,
                grand_total,
                payment_methods: methods,
                waiter_id: waiter_id.or_else(|| paid.iter().find_map(|o| o.waiter_id)),
                is_partial: false,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(table_id, orders = paid.len(), total, tip = request.tip, "Table paid");
        Ok(self.completed("Payment completed", paid, log))
    }

    /// Record part of an order's amount; the order is paid once the
    /// accumulated amount reaches its total
    pub async fn partial_payment(
        &self,
        id: i64,
        request: PartialPaymentRequest,
        waiter_id: Option<i64>,
    ) -> AppResult<PartialPaymentResult> {
        order_money::validate_payment_amount(request.amount)?;
        let mut tx = self.begin().await?;

        let mut current = order::get(&mut *tx, id).await?;
        ensure_unpaid(&current)?;

        let due = remaining(&current);
        if request.amount > due && !money_eq(request.amount, due) {
            return Err(AppError::with_message(
                ErrorCode::InvalidPaymentAmount,
                format!("Amount {:.2} exceeds the {due:.2} due", request.amount),
            )
            .with_detail("remaining", due));
        }

        let amount = order_money::sum([request.amount]);
        if money_eq(amount, due) {
            settle(&mut current, 0.0, &request.payment_method);
        } else {
            current.amount_paid = order_money::sum([current.amount_paid, amount]);
            current.payment_method = Some(request.payment_method.clone());
            current.updated_at = now_millis();
        }
        let saved = order::save_unpaid(&mut *tx, &current).await?;

        let log = payment_log::append(
            &mut *tx,
            &NewPaymentLog {
                table_id: saved.table_id,
                orders: vec![saved.id],
                total: amount,
                tip: 0.0,
                grand_total: amount,
                payment_methods: vec![PaymentMethodAmount {
                    method: request.payment_method,
                    amount,
                }],
                waiter_id: waiter_id.or(saved.waiter_id),
                is_partial: true,
            },
        )
        .await?;
        tx.commit().await.map_err(RepoError::from)?;

        let remaining = remaining(&saved);
        tracing::info!(order_id = id, amount, remaining, paid = saved.paid, "Partial payment recorded");
        emit(
            &*self.events,
            PosEvent::PaymentCompleted,
            &json!({ "tableId": saved.table_id, "orders": [&saved], "paymentLog": &log }),
        );
        Ok(PartialPaymentResult {
            order: saved,
            remaining,
            payment_log: log,
        })
    }

    fn completed(&self, message: &str, orders: Vec<Order>, log: PaymentLog) -> PaymentResult {
        emit(
            &*self.events,
            PosEvent::PaymentCompleted,
            &json!({ "tableId": log.table_id, "orders": &orders, "paymentLog": &log }),
        );
        PaymentResult {
            message: message.to_string(),
            total: log.total,
            tip: log.tip,
            grand_total: log.grand_total,
            orders,
            payment_log: log,
        }
    }
}
