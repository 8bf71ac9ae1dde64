//! Fixtures
//!
//! Checkout scenarios described in YAML: a catalog, a cart, an optional coupon and the
//! store's pricing settings.
//!
//! ```yaml
//! currency: PLN
//! pricing:
//!   tax_rate: "0.23"
//!   free_shipping_threshold: "100"
//!   flat_shipping_fee: "10"
//! products:
//!   TERRACOTTA-30:
//!     name: Terracotta floor tile 30x30
//!     price: "10"
//! cart:
//!   - product: TERRACOTTA-30
//!     quantity: 2
//! ```

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{CartLine, InvalidCart, ProductId},
    coupons::{Coupon, InvalidCoupon, normalize_code},
    money::{CurrencyError, parse_currency},
    orders::OrderLineItem,
    pricing::{InvalidConfig, PricingConfig, Quote, quote},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Invalid pricing settings
    #[error("Invalid pricing settings: {0}")]
    Config(#[from] InvalidConfig),

    /// Coupon definition that staff could not have entered
    #[error("Invalid coupon: {0}")]
    Coupon(#[from] InvalidCoupon),

    /// Cart references a product missing from the catalog
    #[error("Product not found: {0}")]
    ProductNotFound(String),
}

#[derive(Debug, Deserialize)]
struct ScenarioFixture {
    currency: String,
    pricing: PricingFixture,
    products: FxHashMap<String, ProductFixture>,
    cart: Vec<CartLineFixture>,
    #[serde(default)]
    coupon: Option<Coupon>,
    #[serde(default)]
    now: Option<Timestamp>,
    #[serde(default)]
    expected: Option<ExpectedTotals>,
}

#[derive(Debug, Deserialize)]
struct PricingFixture {
    tax_rate: Decimal,
    free_shipping_threshold: Decimal,
    flat_shipping_fee: Decimal,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    price: Decimal,
}

#[derive(Debug, Deserialize)]
struct CartLineFixture {
    product: String,
    quantity: u32,
}

/// Totals a scenario is expected to price to, rounded to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExpectedTotals {
    /// Expected subtotal.
    pub subtotal: Decimal,

    /// Expected discount.
    pub discount: Decimal,

    /// Expected taxable amount.
    pub taxable_amount: Decimal,

    /// Expected tax.
    pub tax: Decimal,

    /// Expected shipping fee.
    pub shipping_fee: Decimal,

    /// Expected total.
    pub total: Decimal,
}

/// A loaded checkout scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    config: PricingConfig,
    lines: Vec<CartLine>,
    product_names: FxHashMap<ProductId, String>,
    coupon: Option<Coupon>,
    now: Timestamp,
    expected: Option<ExpectedTotals>,
}

impl Scenario {
    /// Load `./fixtures/checkout/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a valid scenario.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::load(PathBuf::from("./fixtures/checkout").join(format!("{name}.yml")))
    }

    /// Load a scenario from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a valid scenario.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path.into())?;

        Self::from_yaml(&contents)
    }

    /// Parse a scenario from YAML text.
    ///
    /// Cart lines take their unit price from the scenario's catalog. The coupon code is
    /// normalised and the coupon validated as when staff create one. Without a `now`
    /// entry, coupons are checked at the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, the currency is unknown, the pricing
    /// settings or coupon are invalid or the cart references an unknown product.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        let fixture: ScenarioFixture = serde_norway::from_str(yaml)?;

        let currency = parse_currency(&fixture.currency)?;
        let config = PricingConfig::new(
            fixture.pricing.tax_rate,
            fixture.pricing.free_shipping_threshold,
            fixture.pricing.flat_shipping_fee,
            currency,
        )?;

        let lines = fixture
            .cart
            .iter()
            .map(|line| {
                let product = fixture
                    .products
                    .get(&line.product)
                    .ok_or_else(|| FixtureError::ProductNotFound(line.product.clone()))?;

                Ok(CartLine::new(
                    line.product.as_str(),
                    product.price,
                    line.quantity,
                ))
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let coupon = fixture
            .coupon
            .map(|mut coupon| {
                coupon.code = normalize_code(&coupon.code);
                coupon.validate().map(|()| coupon)
            })
            .transpose()?;

        let product_names = fixture
            .products
            .into_iter()
            .map(|(sku, product)| (ProductId::new(sku), product.name))
            .collect();

        Ok(Self {
            config,
            lines,
            product_names,
            coupon,
            now: fixture.now.unwrap_or(Timestamp::UNIX_EPOCH),
            expected: fixture.expected,
        })
    }

    /// Store pricing settings.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Cart lines, priced from the catalog.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Coupon entered at checkout, if any.
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Instant the scenario is priced at.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Totals the scenario should price to, if recorded.
    pub fn expected(&self) -> Option<&ExpectedTotals> {
        self.expected.as_ref()
    }

    /// Price the scenario with the checkout fallback for inapplicable coupons.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCart`] if the scenario's cart cannot be priced.
    pub fn quote(&self) -> Result<Quote, InvalidCart> {
        quote(&self.lines, self.coupon.as_ref(), &self.config, self.now)
    }

    /// Snapshot the cart as order line items.
    pub fn order_items(&self) -> Vec<OrderLineItem> {
        self.lines
            .iter()
            .map(|line| {
                let name = self
                    .product_names
                    .get(&line.product_id)
                    .map_or_else(|| line.product_id.to_string(), Clone::clone);

                OrderLineItem::snapshot(line, name)
            })
            .collect()
    }
}
