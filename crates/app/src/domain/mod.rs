//! Tessera Domain Concerns

pub mod checkout;
pub mod coupons;
pub mod orders;
pub mod products;
