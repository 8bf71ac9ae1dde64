//! Fixtures shared by command tests.

use jiff::Timestamp;
use rust_decimal_macros::dec;
use rusty_money::iso;
use tessera::{
    cart::CartLine,
    orders::{
        Actor, Order, OrderLineItem, OrderNumber, PaymentMethod, PlaceOrder, ShippingAddress,
    },
    pricing::{PricingConfig, price_order},
};
use tessera_app::domain::orders::models::{OrderRecord, OrderUuid};
use testresult::TestResult;

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Ada Nowak".to_string(),
        line1: "ul. Ceramiczna 4".to_string(),
        line2: Some("m. 2".to_string()),
        city: "Kraków".to_string(),
        postal_code: "30-001".to_string(),
        country: "PL".to_string(),
        phone: None,
    }
}

/// A stored `pending` order for 2 × TERRACOTTA-30 at 10 and 1 × GROUT-GREY at 5.
pub(crate) fn order_record(payment_method: PaymentMethod) -> TestResult<OrderRecord> {
    let placed_at: Timestamp = "2026-10-18T09:30:00Z".parse()?;
    let lines = [
        CartLine::new("TERRACOTTA-30", dec!(10), 2),
        CartLine::new("GROUT-GREY", dec!(5), 1),
    ];
    let config = PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)?;
    let pricing = price_order(&lines, None, &config, placed_at)?;

    let order = Order::place(
        PlaceOrder {
            number: OrderNumber::generate(placed_at, 0x00A1_B2C3),
            customer_email: "ada@example.com".to_string(),
            shipping_address: shipping_address(),
            payment_method,
            items: lines
                .iter()
                .map(|line| OrderLineItem::snapshot(line, format!("{} tile", line.product_id)))
                .collect(),
            coupon_code: None,
        },
        &pricing,
        Actor::new("ada@example.com"),
        placed_at,
    )?;

    Ok(OrderRecord {
        uuid: OrderUuid::new(),
        order,
        updated_at: placed_at,
    })
}
