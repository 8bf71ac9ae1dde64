//! Money
//!
//! Amounts flow through the pricing pipeline as unrounded [`Decimal`]s and are only
//! rounded to two places when they are persisted or displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Number of decimal places stored for every persisted monetary amount.
pub const PERSISTED_SCALE: u32 = 2;

/// Errors resolving a store currency.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// The ISO 4217 code is not known.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Round an amount to the persisted scale, half away from zero.
pub fn round_for_persistence(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(PERSISTED_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Wrap a rounded amount in a [`Money`] value for display.
pub fn to_money(amount: Decimal, currency: &'static iso::Currency) -> Money<'static, iso::Currency> {
    Money::from_decimal(round_for_persistence(amount), currency)
}

/// Look up a currency by its ISO 4217 alpha code (e.g. `PLN`).
///
/// # Errors
///
/// Returns [`CurrencyError::UnknownCurrency`] when the code is not recognised.
pub fn parse_currency(code: &str) -> Result<&'static iso::Currency, CurrencyError> {
    let code = code.trim().to_ascii_uppercase();

    iso::find(&code).ok_or(CurrencyError::UnknownCurrency(code))
}
