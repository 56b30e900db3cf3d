use super::*;
use shared::models::{Area, ItemStatus};

fn line(price: f64, quantity: i32) -> OrderItem {
    OrderItem {
        id: 1,
        menu_item_id: 1,
        name: "Agua".into(),
        price,
        quantity,
        status: ItemStatus::Preparing,
        area: Area::Bar,
        comments: vec![],
    }
}

fn method(name: &str, amount: f64) -> PaymentMethodAmount {
    PaymentMethodAmount {
        method: name.into(),
        amount,
    }
}

#[test]
fn test_to_decimal_precision() {
    let sum_f64 = 0.1_f64 + 0.2_f64;
    assert_ne!(sum_f64, 0.3);
    assert_eq!(to_f64(to_decimal(0.1) + to_decimal(0.2)), 0.3);
}

#[test]
fn test_order_total() {
    let items = vec![line(19.99, 3), line(0.1, 2)];
    assert_eq!(order_total(&items), 60.17);
    assert_eq!(order_total(&[]), 0.0);
}

#[test]
fn test_split_tip_is_proportional() {
    assert_eq!(split_tip(10.0, &[30.0, 70.0]), vec![3.0, 7.0]);
}

#[test]
fn test_split_tip_remainder_goes_to_last() {
    let shares = split_tip(10.0, &[10.0, 10.0, 10.0]);
    assert_eq!(shares, vec![3.33, 3.33, 3.34]);
    assert_eq!(sum(shares), 10.0);
}

#[test]
fn test_split_tip_zero_totals() {
    assert_eq!(split_tip(5.0, &[0.0, 0.0]), vec![0.0, 5.0]);
    assert!(split_tip(5.0, &[]).is_empty());
}

#[test]
fn test_payment_amount_bounds() {
    assert!(validate_payment_amount(10.0).is_ok());
    assert!(validate_payment_amount(0.0).is_err());
    assert!(validate_payment_amount(f64::NAN).is_err());
    assert!(validate_payment_amount(2_000_000.0).is_err());
}

#[test]
fn test_resolve_methods_defaults_to_single() {
    let methods = resolve_methods(&[], Some("card"), 25.5).unwrap();
    assert_eq!(methods, vec![method("card", 25.5)]);

    let methods = resolve_methods(&[], None, 8.0).unwrap();
    assert_eq!(methods[0].method, "cash");
}

#[test]
fn test_resolve_methods_checks_breakdown_sum() {
    let split = vec![method("cash", 20.0), method("card", 10.005)];
    assert!(resolve_methods(&split, None, 30.0).is_ok());

    let err = resolve_methods(&split, None, 31.0).unwrap_err();
    assert_eq!(err.code, ErrorCode::PaymentMethodMismatch);
}
