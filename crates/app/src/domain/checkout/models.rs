//! Checkout Models

use tessera::{
    cart::CartLine,
    coupons::CouponRejection,
    orders::{PaymentMethod, ShippingAddress},
};

use crate::domain::orders::models::OrderRecord;

/// Everything the customer submits at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer_email: String,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,

    /// Cart lines with the prices captured when each product was added.
    pub lines: Vec<CartLine>,

    /// Coupon code as entered, if any.
    pub coupon_code: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub order: OrderRecord,

    /// Why the entered coupon was not applied, to show to the customer.
    pub coupon_rejection: Option<CouponRejection>,
}
