//! Tessera
//!
//! Checkout pricing and order lifecycle rules for the Tessera tile store.
//!
//! Pricing turns a cart snapshot, an optional coupon and the store's tax and shipping
//! settings into the breakdown persisted on an order. Orders then move through a fixed
//! status lifecycle, with every change recorded in an append-only history.

pub mod cart;
pub mod coupons;
pub mod fixtures;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod pricing;
