//! Test Helpers

use jiff::Timestamp;
use rust_decimal::Decimal;
use tessera::{
    cart::{CartLine, ProductId},
    coupons::Coupon,
    orders::{
        Actor, Order, OrderLineItem, OrderNumber, PaymentMethod, PlaceOrder, ShippingAddress,
    },
    pricing::price_order,
};
use testresult::TestResult;

use crate::{
    domain::{
        checkout::models::CheckoutRequest,
        coupons::{
            CouponsService, CouponsServiceError,
            models::{CouponRecord, CouponUuid, NewCoupon},
        },
        products::{
            ProductsService, ProductsServiceError,
            models::{NewProduct, Product, ProductUuid},
        },
    },
    test::{TestContext, context::pricing_config},
};

pub(crate) const CUSTOMER: &str = "ada@example.com";

pub(crate) async fn create_product(
    ctx: &TestContext,
    sku: &str,
    price: Decimal,
    stock: u32,
) -> Result<Product, ProductsServiceError> {
    ctx.products
        .create_product(NewProduct {
            uuid: ProductUuid::new(),
            sku: ProductId::new(sku),
            name: format!("{sku} tile"),
            price,
            stock,
        })
        .await
}

pub(crate) async fn create_coupon(
    ctx: &TestContext,
    coupon: Coupon,
) -> Result<CouponRecord, CouponsServiceError> {
    ctx.coupons
        .create_coupon(NewCoupon {
            uuid: CouponUuid::new(),
            coupon,
        })
        .await
}

pub(crate) fn staff() -> Actor {
    Actor::new("staff@tessera.example")
}

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Ada Nowak".to_string(),
        line1: "ul. Ceramiczna 4".to_string(),
        line2: None,
        city: "Kraków".to_string(),
        postal_code: "30-001".to_string(),
        country: "PL".to_string(),
        phone: Some("+48 600 000 000".to_string()),
    }
}

pub(crate) fn checkout_request(lines: Vec<CartLine>, coupon_code: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        customer_email: CUSTOMER.to_string(),
        shipping_address: shipping_address(),
        payment_method: PaymentMethod::Card,
        lines,
        coupon_code: coupon_code.map(str::to_string),
    }
}

/// A priced `pending` order for 2 × 10 + 1 × 5, not yet stored, with a random order
/// number.
pub(crate) fn place_order(payment_method: PaymentMethod) -> TestResult<Order> {
    let placed_at = Timestamp::from_second(1_792_281_600)?;
    let lines = [
        CartLine::new("TERRACOTTA-30", Decimal::from(10), 2),
        CartLine::new("GROUT-GREY", Decimal::from(5), 1),
    ];

    let pricing = price_order(&lines, None, &pricing_config(), placed_at)?;

    let items = lines
        .iter()
        .map(|line| OrderLineItem::snapshot(line, format!("{} tile", line.product_id)))
        .collect();

    let order = Order::place(
        PlaceOrder {
            number: OrderNumber::generate(placed_at, rand::random()),
            customer_email: CUSTOMER.to_string(),
            shipping_address: shipping_address(),
            payment_method,
            items,
            coupon_code: None,
        },
        &pricing,
        Actor::new(CUSTOMER),
        placed_at,
    )?;

    Ok(order)
}
