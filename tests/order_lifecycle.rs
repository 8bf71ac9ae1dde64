//! Order lifecycle from checkout to a terminal status.

use jiff::{Timestamp, ToSpan};
use rusty_money::iso;
use tessera::{
    fixtures::Scenario,
    orders::{
        Actor, InvalidTransition, Order, OrderNumber, OrderStatus, PaymentMethod, PaymentStatus,
        PlaceOrder, ShippingAddress, apply_transition, revenue, valid_next_statuses,
    },
};
use testresult::TestResult;

fn placed_at() -> TestResult<Timestamp> {
    Ok("2026-10-18T09:15:00Z".parse()?)
}

fn place(scenario: &str, payment_method: PaymentMethod) -> TestResult<Order> {
    let scenario = Scenario::from_set(scenario)?;
    let quote = scenario.quote()?;
    let placed_at = placed_at()?;

    let details = PlaceOrder {
        number: OrderNumber::generate(placed_at, 0x00A1_B2C3),
        customer_email: "ada@example.com".to_string(),
        shipping_address: ShippingAddress {
            full_name: "Ada Nowak".to_string(),
            line1: "ul. Ceramiczna 4".to_string(),
            line2: Some("m. 12".to_string()),
            city: "Kraków".to_string(),
            postal_code: "30-001".to_string(),
            country: "PL".to_string(),
            phone: None,
        },
        payment_method,
        items: scenario.order_items(),
        coupon_code: quote.applied_coupon,
    };

    Ok(Order::place(
        details,
        &quote.pricing,
        Actor::new("ada@example.com"),
        placed_at,
    )?)
}

fn staff() -> Actor {
    Actor::new("staff@tessera.example")
}

#[test]
fn placed_order_snapshots_checkout() -> TestResult {
    let order = place("fixed_coupon_clamped", PaymentMethod::Card)?;

    assert_eq!(order.number().as_str(), "TS-20261018-A1B2C3");
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.payment_status(), PaymentStatus::Paid);
    assert_eq!(order.coupon_code(), Some("WELCOME30"));
    assert_eq!(order.currency(), iso::PLN);
    assert_eq!(order.items().len(), 2);
    assert_eq!(order.history().len(), 1);
    assert_eq!(order.totals().total, rust_decimal_macros::dec!(10));

    Ok(())
}

#[test]
fn shipped_order_cannot_return_to_pending() -> TestResult {
    let mut order = place("no_coupon", PaymentMethod::CashOnDelivery)?;
    let mut now = placed_at()?;

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
    ] {
        now = now.checked_add(1.hour())?;
        order.apply_transition(status, staff(), None, now)?;
    }

    let before = order.clone();
    let result = order.apply_transition(OrderStatus::Pending, staff(), None, now);

    assert_eq!(
        result,
        Err(InvalidTransition {
            from: OrderStatus::Shipped,
            to: OrderStatus::Pending,
        })
    );
    assert_eq!(order, before);

    Ok(())
}

#[test]
fn cancelling_pending_order_records_one_event() -> TestResult {
    let order = place("no_coupon", PaymentMethod::BankTransfer)?;
    let before: Vec<_> = order.history().iter().cloned().collect();
    let now = placed_at()?.checked_add(30.minutes())?;

    let order = apply_transition(
        order,
        OrderStatus::Cancelled,
        staff(),
        Some("customer requested".to_string()),
        now,
    )?;

    assert_eq!(order.status(), OrderStatus::Cancelled);
    assert_eq!(order.history().len(), before.len() + 1);
    assert_eq!(order.history().as_slice().get(..before.len()), Some(before.as_slice()));

    let latest = order.history().latest();

    assert_eq!(latest.map(|event| event.status), Some(OrderStatus::Cancelled));
    assert_eq!(latest.map(|event| event.timestamp), Some(now));
    assert_eq!(latest.map(|event| &event.updated_by), Some(&staff()));
    assert_eq!(
        latest.and_then(|event| event.note.as_deref()),
        Some("customer requested")
    );
    assert!(valid_next_statuses(OrderStatus::Cancelled).is_empty());
    assert!(order.valid_next_statuses().is_empty());

    Ok(())
}

#[test]
fn every_transition_appends_exactly_one_event() -> TestResult {
    let mut order = place("free_shipping", PaymentMethod::Card)?;
    let mut now = placed_at()?;

    while let Some(&next) = order.valid_next_statuses().first() {
        let before = order.history().clone();

        now = now.checked_add(24.hours())?;
        order.apply_transition(next, staff(), None, now)?;

        assert_eq!(order.history().len(), before.len() + 1);
        assert_eq!(
            order.history().as_slice().get(..before.len()),
            Some(before.as_slice())
        );
    }

    assert_eq!(order.status(), OrderStatus::Delivered);
    assert_eq!(order.history().len(), 5);

    Ok(())
}

#[test]
fn cancelled_orders_are_excluded_from_revenue() -> TestResult {
    let pending = place("no_coupon", PaymentMethod::Card)?;
    let cancelled = apply_transition(
        place("free_shipping", PaymentMethod::Card)?,
        OrderStatus::Cancelled,
        staff(),
        None,
        placed_at()?,
    )?;

    assert_eq!(
        revenue([&pending, &cancelled]),
        pending.totals().total
    );

    Ok(())
}
