//! Tessera prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine, InvalidCart, ProductId},
    coupons::{Coupon, CouponRejection, CouponStatus, DiscountType, InvalidCoupon},
    fixtures::{FixtureError, Scenario},
    money::{CurrencyError, parse_currency, round_for_persistence},
    orders::{
        Actor, InvalidTransition, Order, OrderLineItem, OrderNumber, OrderStatus, OrderTotals,
        PaymentMethod, PaymentStatus, PlaceOrder, ShippingAddress, StatusEvent, StatusHistory,
        apply_transition, can_transition, revenue, valid_next_statuses,
    },
    pricing::{PricingConfig, PricingError, PricingResult, Quote, price_order, quote},
};
