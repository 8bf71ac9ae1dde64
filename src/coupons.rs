//! Coupons

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` is percent points off the subtotal (e.g. `20` for 20%).
    Percentage,

    /// `discount_value` is an absolute amount off the subtotal.
    Fixed,
}

impl DiscountType {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscountType {
    type Err = InvalidCoupon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountType::Percentage),
            "fixed" => Ok(DiscountType::Fixed),
            other => Err(InvalidCoupon::UnknownDiscountType(other.to_string())),
        }
    }
}

/// Whether staff have enabled the coupon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    /// Coupon can be redeemed.
    #[default]
    Active,

    /// Coupon has been switched off.
    Inactive,
}

impl CouponStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            CouponStatus::Active => "active",
            CouponStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CouponStatus {
    type Err = InvalidCoupon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(CouponStatus::Active),
            "inactive" => Ok(CouponStatus::Inactive),
            other => Err(InvalidCoupon::UnknownStatus(other.to_string())),
        }
    }
}

/// Reasons a coupon cannot be applied to an order.
///
/// The `Display` text is shown to the customer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    /// Coupon is switched off.
    #[error("this coupon is no longer active")]
    Inactive,

    /// Coupon expiry has passed.
    #[error("this coupon expired on {expired_at}")]
    Expired {
        /// When the coupon stopped being valid.
        expired_at: Timestamp,
    },

    /// Coupon has been used as many times as allowed.
    #[error("this coupon has reached its usage limit of {limit}")]
    UsageLimitReached {
        /// Maximum number of redemptions.
        limit: u32,
    },

    /// Order does not meet the coupon's minimum value.
    #[error("this coupon requires a minimum order of {minimum}; your order is {subtotal}")]
    BelowMinimumOrder {
        /// Required pre-discount subtotal.
        minimum: Decimal,

        /// Actual pre-discount subtotal, rounded for display.
        subtotal: Decimal,
    },
}

/// Data-entry errors for coupon definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCoupon {
    /// Coupon code is blank.
    #[error("coupon code cannot be empty")]
    EmptyCode,

    /// Discount value below zero.
    #[error("discount value cannot be negative")]
    NegativeDiscount,

    /// Percentage discount above 100%.
    #[error("percentage discount cannot exceed 100, got {0}")]
    PercentageOutOfRange(Decimal),

    /// Minimum order value below zero.
    #[error("minimum order value cannot be negative")]
    NegativeMinimumOrder,

    /// Unrecognised discount type string.
    #[error("unknown discount type: {0}")]
    UnknownDiscountType(String),

    /// Unrecognised status string.
    #[error("unknown coupon status: {0}")]
    UnknownStatus(String),
}

/// Normalise a customer-entered coupon code for lookup.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Coupon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Redemption code, stored upper-case.
    pub code: String,

    /// How `discount_value` applies.
    pub discount_type: DiscountType,

    /// Percent points or absolute amount, depending on `discount_type`.
    pub discount_value: Decimal,

    /// Minimum pre-discount subtotal, if any.
    #[serde(default)]
    pub min_order_value: Option<Decimal>,

    /// Maximum number of redemptions, if any.
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions so far.
    #[serde(default)]
    pub used_count: u32,

    /// Last instant the coupon may be used, if any.
    #[serde(default)]
    pub expires_at: Option<Timestamp>,

    /// Staff toggle.
    #[serde(default)]
    pub status: CouponStatus,
}

impl Coupon {
    /// Create an active, unlimited coupon.
    pub fn new(code: &str, discount_type: DiscountType, discount_value: Decimal) -> Self {
        Self {
            code: normalize_code(code),
            discount_type,
            discount_value,
            min_order_value: None,
            usage_limit: None,
            used_count: 0,
            expires_at: None,
            status: CouponStatus::Active,
        }
    }

    /// Require a minimum pre-discount subtotal.
    #[must_use]
    pub fn with_min_order_value(mut self, minimum: Decimal) -> Self {
        self.min_order_value = Some(minimum);
        self
    }

    /// Limit the number of redemptions.
    #[must_use]
    pub fn with_usage_limit(mut self, limit: u32) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Set the expiry instant.
    #[must_use]
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Validate the coupon definition as entered by staff.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidCoupon`] describing the first problem found.
    pub fn validate(&self) -> Result<(), InvalidCoupon> {
        if self.code.trim().is_empty() {
            return Err(InvalidCoupon::EmptyCode);
        }

        if self.discount_value < Decimal::ZERO {
            return Err(InvalidCoupon::NegativeDiscount);
        }

        if self.discount_type == DiscountType::Percentage
            && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(InvalidCoupon::PercentageOutOfRange(self.discount_value));
        }

        if self.min_order_value.is_some_and(|min| min < Decimal::ZERO) {
            return Err(InvalidCoupon::NegativeMinimumOrder);
        }

        Ok(())
    }

    /// Check whether the coupon can be applied to an order with the given pre-discount
    /// subtotal at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`CouponRejection`], checked in the order: status, expiry,
    /// usage limit, minimum order value.
    pub fn check_applicable(&self, subtotal: Decimal, now: Timestamp) -> Result<(), CouponRejection> {
        if self.status != CouponStatus::Active {
            return Err(CouponRejection::Inactive);
        }

        if let Some(expired_at) = self.expires_at
            && expired_at < now
        {
            return Err(CouponRejection::Expired { expired_at });
        }

        if let Some(limit) = self.usage_limit
            && self.used_count >= limit
        {
            return Err(CouponRejection::UsageLimitReached { limit });
        }

        if let Some(minimum) = self.min_order_value
            && subtotal < minimum
        {
            return Err(CouponRejection::BelowMinimumOrder {
                minimum,
                subtotal: crate::money::round_for_persistence(subtotal),
            });
        }

        Ok(())
    }

    /// Discount this coupon grants on a subtotal, never more than the subtotal itself.
    ///
    /// Does not check applicability.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let fraction =
                    (self.discount_value / Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE);

                Percentage::from(fraction) * subtotal.max(Decimal::ZERO)
            }
            DiscountType::Fixed => self.discount_value,
        };

        discount.clamp(Decimal::ZERO, subtotal.max(Decimal::ZERO))
    }
}
