//! Cart
//!
//! A cart is a plain value owned by the shopping session. It is handed to checkout as a
//! slice of [`CartLine`]s and never shared between sessions.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog identifier (SKU) of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product identifier.
    pub fn new(sku: impl Into<String>) -> Self {
        Self(sku.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Reasons a set of cart lines cannot be priced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidCart {
    /// The cart has no lines.
    #[error("cart is empty")]
    Empty,

    /// A line has a quantity below one (line index, product).
    #[error("line {0} ({1}) has a quantity below 1")]
    ZeroQuantity(usize, ProductId),

    /// A line has a negative unit price (line index, product).
    #[error("line {0} ({1}) has a negative unit price")]
    NegativePrice(usize, ProductId),

    /// The cart's amounts do not fit in a [`Decimal`].
    #[error("cart amounts are too large to price")]
    AmountOverflow,
}

/// A product in the cart with the price captured when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product being bought.
    pub product_id: ProductId,

    /// Catalog price at add-to-cart time.
    pub unit_price: Decimal,

    /// Number of units.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a new cart line.
    pub fn new(product_id: impl Into<ProductId>, unit_price: Decimal, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            unit_price,
            quantity,
        }
    }

    /// Extended price of the line (`unit_price × quantity`), unrounded.
    ///
    /// `None` if the product overflows a [`Decimal`].
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Check that the lines form a priceable cart.
///
/// # Errors
///
/// Returns the first [`InvalidCart`] reason found, scanning lines in order.
pub fn validate_lines(lines: &[CartLine]) -> Result<(), InvalidCart> {
    if lines.is_empty() {
        return Err(InvalidCart::Empty);
    }

    lines.iter().enumerate().try_for_each(|(i, line)| {
        if line.quantity < 1 {
            Err(InvalidCart::ZeroQuantity(i, line.product_id.clone()))
        } else if line.unit_price < Decimal::ZERO {
            Err(InvalidCart::NegativePrice(i, line.product_id.clone()))
        } else {
            Ok(())
        }
    })
}

/// Shopping cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add units of a product.
    ///
    /// Adding a product that is already in the cart increases its quantity and keeps the
    /// price captured by the first add. Adding zero units is a no-op.
    pub fn add_line(&mut self, product_id: impl Into<ProductId>, unit_price: Decimal, quantity: u32) {
        if quantity == 0 {
            return;
        }

        let product_id = product_id.into();

        if let Some(line) = self.line_mut(&product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines
                .push(CartLine::new(product_id, unit_price, quantity));
        }
    }

    /// Set the quantity of a product already in the cart. Zero removes the line.
    ///
    /// Returns `false` when the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove_line(product_id);
        }

        match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a product from the cart. Returns `false` when it was not present.
    pub fn remove_line(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| &line.product_id != product_id);

        self.lines.len() != before
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Empty the cart, e.g. after a successful checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

impl From<Vec<CartLine>> for Cart {
    fn from(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    fn tiles() -> Cart {
        let mut cart = Cart::new();

        cart.add_line("TERRACOTTA-30", dec!(10), 2);
        cart.add_line("GROUT-GREY", dec!(5), 1);

        cart
    }

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let line = CartLine::new("TERRACOTTA-30", dec!(12.49), 3);

        assert_eq!(line.line_total(), Some(dec!(37.47)));
    }

    #[test]
    fn line_total_reports_overflow() {
        let line = CartLine::new("TERRACOTTA-30", Decimal::MAX, 2);

        assert_eq!(line.line_total(), None);
    }

    #[test]
    fn add_line_merges_same_product_and_keeps_first_price() {
        let mut cart = tiles();

        cart.add_line("TERRACOTTA-30", dec!(11), 3);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.item_count(), 6);
        assert_eq!(
            cart.lines().first(),
            Some(&CartLine::new("TERRACOTTA-30", dec!(10), 5))
        );
    }

    #[test]
    fn add_line_ignores_zero_quantity() {
        let mut cart = Cart::new();

        cart.add_line("GROUT-GREY", dec!(5), 0);

        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_updates_or_removes() {
        let mut cart = tiles();
        let grout = ProductId::new("GROUT-GREY");

        assert!(cart.set_quantity(&grout, 4));
        assert_eq!(cart.item_count(), 6);

        assert!(cart.set_quantity(&grout, 0));
        assert_eq!(cart.len(), 1);

        assert!(!cart.set_quantity(&ProductId::new("UNKNOWN"), 1));
    }

    #[test]
    fn remove_line_reports_presence() {
        let mut cart = tiles();

        assert!(cart.remove_line(&ProductId::new("TERRACOTTA-30")));
        assert!(!cart.remove_line(&ProductId::new("TERRACOTTA-30")));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = tiles();

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn validate_lines_accepts_valid_cart() -> TestResult {
        validate_lines(tiles().lines())?;

        Ok(())
    }

    #[test]
    fn validate_lines_rejects_empty_cart() {
        assert_eq!(validate_lines(&[]), Err(InvalidCart::Empty));
    }

    #[test]
    fn validate_lines_rejects_zero_quantity() {
        let lines = [
            CartLine::new("TERRACOTTA-30", dec!(10), 1),
            CartLine::new("GROUT-GREY", dec!(5), 0),
        ];

        assert_eq!(
            validate_lines(&lines),
            Err(InvalidCart::ZeroQuantity(1, ProductId::new("GROUT-GREY")))
        );
    }

    #[test]
    fn validate_lines_rejects_negative_price() {
        let lines = [CartLine::new("TERRACOTTA-30", dec!(-0.01), 1)];

        assert_eq!(
            validate_lines(&lines),
            Err(InvalidCart::NegativePrice(0, ProductId::new("TERRACOTTA-30")))
        );
    }

    #[test]
    fn validate_lines_accepts_free_items() -> TestResult {
        validate_lines(&[CartLine::new("SAMPLE-CHIP", Decimal::ZERO, 1)])?;

        Ok(())
    }
}
