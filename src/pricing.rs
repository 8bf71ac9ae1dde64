//! Pricing
//!
//! Turns a cart snapshot, an optional coupon and the store's tax/shipping settings into
//! the monetary breakdown persisted on an order. The steps run in a fixed order and no
//! intermediate value is rounded:
//!
//! 1. `subtotal = Σ unit_price × quantity`
//! 2. `discount` from the coupon, clamped to the subtotal
//! 3. `taxable_amount = subtotal − discount`
//! 4. `tax = taxable_amount × tax_rate`
//! 5. `shipping_fee = 0` if `taxable_amount > free_shipping_threshold`, else the flat fee
//! 6. `total = taxable_amount + tax + shipping_fee`

use std::io;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::{CartLine, InvalidCart, validate_lines},
    coupons::{Coupon, CouponRejection},
    money::{round_for_persistence, to_money},
};

/// Errors that prevent an order from being priced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The cart lines are malformed.
    #[error(transparent)]
    InvalidCart(#[from] InvalidCart),

    /// The supplied coupon cannot be used on this order.
    #[error("coupon cannot be applied: {0}")]
    CouponInapplicable(#[from] CouponRejection),
}

/// Store configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidConfig {
    /// Tax rate below zero.
    #[error("tax rate cannot be negative")]
    NegativeTaxRate,

    /// Free shipping threshold below zero.
    #[error("free shipping threshold cannot be negative")]
    NegativeThreshold,

    /// Flat shipping fee below zero.
    #[error("flat shipping fee cannot be negative")]
    NegativeShippingFee,
}

/// Site-wide tax and shipping settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    tax_rate: Decimal,
    free_shipping_threshold: Decimal,
    flat_shipping_fee: Decimal,
    currency: &'static Currency,
}

impl PricingConfig {
    /// Create a validated pricing configuration.
    ///
    /// `tax_rate` is a fraction, e.g. `0.23` for 23% VAT.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidConfig`] if any value is negative.
    pub fn new(
        tax_rate: Decimal,
        free_shipping_threshold: Decimal,
        flat_shipping_fee: Decimal,
        currency: &'static Currency,
    ) -> Result<Self, InvalidConfig> {
        if tax_rate < Decimal::ZERO {
            return Err(InvalidConfig::NegativeTaxRate);
        }

        if free_shipping_threshold < Decimal::ZERO {
            return Err(InvalidConfig::NegativeThreshold);
        }

        if flat_shipping_fee < Decimal::ZERO {
            return Err(InvalidConfig::NegativeShippingFee);
        }

        Ok(Self {
            tax_rate,
            free_shipping_threshold,
            flat_shipping_fee,
            currency,
        })
    }

    /// Tax rate as a fraction.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Taxable amounts strictly above this ship for free.
    pub fn free_shipping_threshold(&self) -> Decimal {
        self.free_shipping_threshold
    }

    /// Shipping fee charged at or below the threshold.
    pub fn flat_shipping_fee(&self) -> Decimal {
        self.flat_shipping_fee
    }

    /// Store currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Monetary breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingResult {
    subtotal: Decimal,
    discount: Decimal,
    taxable_amount: Decimal,
    tax: Decimal,
    shipping_fee: Decimal,
    total: Decimal,
    currency: &'static Currency,
}

impl PricingResult {
    /// Sum of line totals before any discount.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Coupon discount.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Subtotal minus discount; the base for tax and the free-shipping check.
    pub fn taxable_amount(&self) -> Decimal {
        self.taxable_amount
    }

    /// Tax on the taxable amount.
    pub fn tax(&self) -> Decimal {
        self.tax
    }

    /// Shipping charge.
    pub fn shipping_fee(&self) -> Decimal {
        self.shipping_fee
    }

    /// Amount the customer pays.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Currency of every amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Whether shipping was waived.
    pub fn ships_free(&self) -> bool {
        self.shipping_fee.is_zero()
    }

    /// The breakdown with every field rounded to two places, as persisted on the order.
    ///
    /// Each field is rounded from its own unrounded value.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_for_persistence(self.subtotal),
            discount: round_for_persistence(self.discount),
            taxable_amount: round_for_persistence(self.taxable_amount),
            tax: round_for_persistence(self.tax),
            shipping_fee: round_for_persistence(self.shipping_fee),
            total: round_for_persistence(self.total),
            currency: self.currency,
        }
    }

    /// The total as a [`Money`] value, e.g. to open a payment session.
    pub fn total_money(&self) -> Money<'static, Currency> {
        to_money(self.total, self.currency)
    }

    /// Render the breakdown as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_summary(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut builder = Builder::default();

        builder.push_record(["", "Amount"]);

        for (label, amount) in [
            ("Subtotal", self.subtotal),
            ("Discount", self.discount),
            ("Taxable amount", self.taxable_amount),
            ("Tax", self.tax),
            ("Shipping", self.shipping_fee),
            ("Total", self.total),
        ] {
            builder.push_record([label.to_string(), to_money(amount, self.currency).to_string()]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(1..2), Alignment::right());

        writeln!(out, "{table}")
    }
}

/// Price an order.
///
/// # Errors
///
/// - [`PricingError::InvalidCart`]: the cart is empty or a line is malformed.
/// - [`PricingError::CouponInapplicable`]: a coupon was supplied but fails its rules.
pub fn price_order(
    lines: &[CartLine],
    coupon: Option<&Coupon>,
    config: &PricingConfig,
    now: Timestamp,
) -> Result<PricingResult, PricingError> {
    validate_lines(lines)?;

    let subtotal = subtotal(lines)?;

    let discount = match coupon {
        Some(coupon) => {
            coupon.check_applicable(subtotal, now)?;
            coupon.discount_for(subtotal)
        }
        None => Decimal::ZERO,
    };

    breakdown(subtotal, discount, config).map_err(PricingError::from)
}

/// Outcome of pricing with the checkout fallback applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// The breakdown the customer is asked to pay.
    pub pricing: PricingResult,

    /// Code of the coupon that was applied, if any.
    pub applied_coupon: Option<String>,

    /// Why a supplied coupon was ignored, to surface to the customer.
    pub coupon_rejection: Option<CouponRejection>,
}

/// Price an order, ignoring a coupon that cannot be applied.
///
/// # Errors
///
/// Returns [`InvalidCart`] if the cart is empty, a line is malformed or the amounts
/// overflow.
pub fn quote(
    lines: &[CartLine],
    coupon: Option<&Coupon>,
    config: &PricingConfig,
    now: Timestamp,
) -> Result<Quote, InvalidCart> {
    match price_order(lines, coupon, config, now) {
        Ok(pricing) => Ok(Quote {
            pricing,
            applied_coupon: coupon.map(|coupon| coupon.code.clone()),
            coupon_rejection: None,
        }),
        Err(PricingError::CouponInapplicable(rejection)) => Ok(Quote {
            pricing: breakdown(subtotal(lines)?, Decimal::ZERO, config)?,
            applied_coupon: None,
            coupon_rejection: Some(rejection),
        }),
        Err(PricingError::InvalidCart(invalid)) => Err(invalid),
    }
}

fn subtotal(lines: &[CartLine]) -> Result<Decimal, InvalidCart> {
    lines.iter().try_fold(Decimal::ZERO, |sum, line| {
        line.line_total()
            .and_then(|total| sum.checked_add(total))
            .ok_or(InvalidCart::AmountOverflow)
    })
}

fn breakdown(
    subtotal: Decimal,
    discount: Decimal,
    config: &PricingConfig,
) -> Result<PricingResult, InvalidCart> {
    // discount is clamped to [0, subtotal], so this cannot overflow
    let taxable_amount = subtotal - discount;

    let tax = taxable_amount
        .checked_mul(config.tax_rate)
        .ok_or(InvalidCart::AmountOverflow)?;

    let shipping_fee = if taxable_amount > config.free_shipping_threshold {
        Decimal::ZERO
    } else {
        config.flat_shipping_fee
    };

    let total = taxable_amount
        .checked_add(tax)
        .and_then(|amount| amount.checked_add(shipping_fee))
        .ok_or(InvalidCart::AmountOverflow)?;

    Ok(PricingResult {
        subtotal,
        discount,
        taxable_amount,
        tax,
        shipping_fee,
        total,
        currency: config.currency,
    })
}
