//! Orders
//!
//! An [`Order`] is created once at checkout, in [`OrderStatus::Pending`], and from then on
//! only its status and status history change. Every status change goes through
//! [`Order::apply_transition`], which enforces the lifecycle in [`status`] and records an
//! entry in the order's [`StatusHistory`].

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{CartLine, ProductId},
    money::round_for_persistence,
    pricing::PricingResult,
};

pub mod history;
pub mod number;
pub mod status;

pub use history::{Actor, StatusEvent, StatusHistory};
pub use number::{InvalidOrderNumber, OrderNumber};
pub use status::{OrderStatus, StatusSet, can_transition, valid_next_statuses};

/// A status change that the lifecycle does not allow.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot move order from {from} to {to}")]
pub struct InvalidTransition {
    /// Status the order is in.
    pub from: OrderStatus,

    /// Status that was requested.
    pub to: OrderStatus,
}

/// Errors building a new order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaceOrderError {
    /// The order has no line items.
    #[error("an order needs at least one item")]
    NoItems,

    /// Line item totals do not fit in a [`Decimal`].
    #[error("line items are too large to total")]
    ItemsOverflow,

    /// Line items do not add up to the priced subtotal.
    #[error("line items total {items} but pricing subtotal is {pricing}")]
    SubtotalMismatch {
        /// Sum of item line totals.
        items: Decimal,

        /// Subtotal from pricing.
        pricing: Decimal,
    },
}

/// Persisted order data that breaks the lifecycle rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorruptOrder {
    /// The order has no status history.
    #[error("order {0} has no status history")]
    EmptyHistory(OrderNumber),

    /// The first history entry is not `pending`.
    #[error("order {0} history does not start in pending")]
    NotStartedPending(OrderNumber),

    /// Two consecutive history entries are not a legal transition.
    #[error("order {number} history moves from {from} to {to}")]
    IllegalHistory {
        /// Order affected.
        number: OrderNumber,

        /// Earlier status.
        from: OrderStatus,

        /// Later status.
        to: OrderStatus,
    },

    /// The stored status differs from the latest history entry.
    #[error("order {number} is {status} but its history ends in {latest}")]
    StatusMismatch {
        /// Order affected.
        number: OrderNumber,

        /// Stored status.
        status: OrderStatus,

        /// Latest history status.
        latest: OrderStatus,
    },
}

/// How the customer chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment captured by the payment gateway before the order is stored.
    Card,

    /// Paid to the courier on delivery.
    CashOnDelivery,

    /// Paid by bank transfer after ordering.
    BankTransfer,
}

impl PaymentMethod {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Payment status of a freshly placed order using this method.
    pub const fn initial_payment_status(self) -> PaymentStatus {
        match self {
            PaymentMethod::Card => PaymentStatus::Paid,
            PaymentMethod::CashOnDelivery | PaymentMethod::BankTransfer => PaymentStatus::Pending,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(UnknownPaymentValue(other.to_string())),
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not paid yet.
    Pending,

    /// Payment received.
    Paid,

    /// Payment attempt failed.
    Failed,

    /// Payment returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = UnknownPaymentValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(UnknownPaymentValue(other.to_string())),
        }
    }
}

/// An unrecognised payment method or payment status string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown payment value: {0}")]
pub struct UnknownPaymentValue(pub String);

/// Delivery address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Recipient name.
    pub full_name: String,

    /// Street and number.
    pub line1: String,

    /// Flat, floor, etc.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,

    /// City or town.
    pub city: String,

    /// Postal code.
    pub postal_code: String,

    /// ISO 3166 alpha-2 country code.
    pub country: String,

    /// Contact phone for the courier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A purchased product, copied from the cart and catalog at checkout so that later
/// catalog edits do not change historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Product bought.
    pub product_id: ProductId,

    /// Product name at checkout.
    pub product_name: String,

    /// Unit price at checkout.
    pub unit_price: Decimal,

    /// Units bought.
    pub quantity: u32,
}

impl OrderLineItem {
    /// Snapshot a cart line with the product's current name.
    pub fn snapshot(line: &CartLine, product_name: impl Into<String>) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: product_name.into(),
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }

    /// `unit_price × quantity`, unrounded. `None` on overflow.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Persisted monetary totals of an order, rounded to two places.
///
/// Every field is rounded from its own unrounded value, so
/// `subtotal - discount + tax + shipping_fee` can be a cent away from `total`.
/// Reports should read `total` rather than rebuild it from the parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of line totals.
    pub subtotal: Decimal,

    /// Coupon discount.
    pub discount: Decimal,

    /// Tax on the post-discount amount.
    pub tax: Decimal,

    /// Shipping charge.
    pub shipping_fee: Decimal,

    /// Amount charged.
    pub total: Decimal,
}

impl From<&PricingResult> for OrderTotals {
    fn from(pricing: &PricingResult) -> Self {
        let rounded = pricing.rounded();

        Self {
            subtotal: rounded.subtotal(),
            discount: rounded.discount(),
            tax: rounded.tax(),
            shipping_fee: rounded.shipping_fee(),
            total: rounded.total(),
        }
    }
}

/// Checkout details needed to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    /// Reference shown to the customer.
    pub number: OrderNumber,

    /// Customer contact e-mail.
    pub customer_email: String,

    /// Delivery address.
    pub shipping_address: ShippingAddress,

    /// Chosen payment method.
    pub payment_method: PaymentMethod,

    /// Snapshot of the cart.
    pub items: Vec<OrderLineItem>,

    /// Applied coupon code, if any.
    pub coupon_code: Option<String>,
}

/// Every field of a stored order, used to rebuild an [`Order`] from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParts {
    /// Order reference.
    pub number: OrderNumber,

    /// Stored status.
    pub status: OrderStatus,

    /// Customer contact e-mail.
    pub customer_email: String,

    /// Delivery address.
    pub shipping_address: ShippingAddress,

    /// Payment method.
    pub payment_method: PaymentMethod,

    /// Payment state.
    pub payment_status: PaymentStatus,

    /// Monetary totals.
    pub totals: OrderTotals,

    /// Order currency.
    pub currency: &'static Currency,

    /// Applied coupon code.
    pub coupon_code: Option<String>,

    /// Line items.
    pub items: Vec<OrderLineItem>,

    /// Status changes, oldest first.
    pub history: Vec<StatusEvent>,

    /// Checkout time.
    pub placed_at: Timestamp,
}

/// Order
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    number: OrderNumber,
    status: OrderStatus,
    customer_email: String,
    shipping_address: ShippingAddress,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    totals: OrderTotals,
    currency: &'static Currency,
    coupon_code: Option<String>,
    items: Vec<OrderLineItem>,
    history: StatusHistory,
    placed_at: Timestamp,
}

impl Order {
    /// Place a new order in `pending`, with a single history entry attributed to
    /// `placed_by`.
    ///
    /// # Errors
    ///
    /// - [`PlaceOrderError::NoItems`]: `details.items` is empty.
    /// - [`PlaceOrderError::ItemsOverflow`]: the item totals overflow.
    /// - [`PlaceOrderError::SubtotalMismatch`]: the items were not the lines that were
    ///   priced.
    pub fn place(
        details: PlaceOrder,
        pricing: &PricingResult,
        placed_by: Actor,
        now: Timestamp,
    ) -> Result<Self, PlaceOrderError> {
        if details.items.is_empty() {
            return Err(PlaceOrderError::NoItems);
        }

        let items_total = details
            .items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| {
                item.line_total().and_then(|total| sum.checked_add(total))
            })
            .ok_or(PlaceOrderError::ItemsOverflow)?;

        if items_total != pricing.subtotal() {
            return Err(PlaceOrderError::SubtotalMismatch {
                items: items_total,
                pricing: pricing.subtotal(),
            });
        }

        let history = StatusHistory::starting_with(StatusEvent::new(
            OrderStatus::Pending,
            now,
            placed_by,
            None,
        ));

        Ok(Self {
            number: details.number,
            status: OrderStatus::Pending,
            customer_email: details.customer_email,
            shipping_address: details.shipping_address,
            payment_method: details.payment_method,
            payment_status: details.payment_method.initial_payment_status(),
            totals: OrderTotals::from(pricing),
            currency: pricing.currency(),
            coupon_code: details.coupon_code,
            items: details.items,
            history,
            placed_at: now,
        })
    }

    /// Rebuild a stored order, checking that its history is a legal walk through the
    /// lifecycle ending in the stored status.
    ///
    /// # Errors
    ///
    /// Returns a [`CorruptOrder`] describing the first inconsistency found.
    pub fn from_parts(parts: OrderParts) -> Result<Self, CorruptOrder> {
        let number = parts.number;

        let Some(first) = parts.history.first() else {
            return Err(CorruptOrder::EmptyHistory(number));
        };

        if first.status != OrderStatus::Pending {
            return Err(CorruptOrder::NotStartedPending(number));
        }

        if let Some((from, to)) = parts
            .history
            .windows(2)
            .filter_map(|pair| match pair {
                [earlier, later] => Some((earlier.status, later.status)),
                _ => None,
            })
            .find(|(from, to)| !can_transition(*from, *to))
        {
            return Err(CorruptOrder::IllegalHistory { number, from, to });
        }

        let latest = parts
            .history
            .last()
            .map_or(OrderStatus::Pending, |event| event.status);

        if latest != parts.status {
            return Err(CorruptOrder::StatusMismatch {
                number,
                status: parts.status,
                latest,
            });
        }

        Ok(Self {
            number,
            status: parts.status,
            customer_email: parts.customer_email,
            shipping_address: parts.shipping_address,
            payment_method: parts.payment_method,
            payment_status: parts.payment_status,
            totals: parts.totals,
            currency: parts.currency,
            coupon_code: parts.coupon_code,
            items: parts.items,
            history: StatusHistory::from_events(parts.history),
            placed_at: parts.placed_at,
        })
    }

    /// Move the order to `to`, recording who did it and why.
    ///
    /// Returns the recorded event.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] if the lifecycle does not allow the change; the order
    /// is left untouched.
    pub fn apply_transition(
        &mut self,
        to: OrderStatus,
        actor: Actor,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<StatusEvent, InvalidTransition> {
        if !can_transition(self.status, to) {
            return Err(InvalidTransition {
                from: self.status,
                to,
            });
        }

        let event = StatusEvent::new(to, now, actor, note);

        self.status = to;
        self.history.append(event.clone());

        Ok(event)
    }

    /// Statuses staff may move this order to.
    pub fn valid_next_statuses(&self) -> StatusSet {
        valid_next_statuses(self.status)
    }

    /// Order reference.
    pub fn number(&self) -> &OrderNumber {
        &self.number
    }

    /// Current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Customer contact e-mail.
    pub fn customer_email(&self) -> &str {
        &self.customer_email
    }

    /// Delivery address.
    pub fn shipping_address(&self) -> &ShippingAddress {
        &self.shipping_address
    }

    /// Payment method.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Payment state.
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Monetary totals.
    pub fn totals(&self) -> &OrderTotals {
        &self.totals
    }

    /// Order currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Applied coupon code.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Line items.
    pub fn items(&self) -> &[OrderLineItem] {
        &self.items
    }

    /// Status changes, oldest first.
    pub fn history(&self) -> &StatusHistory {
        &self.history
    }

    /// Checkout time.
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }
}

/// Consume an order and return it moved to `to`.
///
/// # Errors
///
/// Returns [`InvalidTransition`] if the lifecycle does not allow the change.
pub fn apply_transition(
    mut order: Order,
    to: OrderStatus,
    actor: Actor,
    note: Option<String>,
    now: Timestamp,
) -> Result<Order, InvalidTransition> {
    order.apply_transition(to, actor, note, now)?;

    Ok(order)
}

/// Sum persisted totals for reporting, e.g. revenue on the admin dashboard.
pub fn revenue<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Decimal {
    round_for_persistence(
        orders
            .into_iter()
            .filter(|order| order.status() != OrderStatus::Cancelled)
            .map(|order| order.totals().total)
            .sum(),
    )
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;
    use crate::{
        coupons::{Coupon, DiscountType},
        pricing::{PricingConfig, price_order},
    };

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Nowak".to_string(),
            line1: "ul. Ceramiczna 4".to_string(),
            line2: None,
            city: "Kraków".to_string(),
            postal_code: "30-001".to_string(),
            country: "PL".to_string(),
            phone: None,
        }
    }

    fn staff() -> Actor {
        Actor::new("staff@tessera.example")
    }

    fn placed_order() -> TestResult<Order> {
        let lines = [
            CartLine::new("TERRACOTTA-30", dec!(10), 2),
            CartLine::new("GROUT-GREY", dec!(5), 1),
        ];
        let config = PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)?;
        let pricing = price_order(&lines, None, &config, Timestamp::UNIX_EPOCH)?;

        let items = lines
            .iter()
            .map(|line| OrderLineItem::snapshot(line, format!("Tile {}", line.product_id)))
            .collect();

        Ok(Order::place(
            PlaceOrder {
                number: OrderNumber::generate(Timestamp::UNIX_EPOCH, 1),
                customer_email: "ada@example.com".to_string(),
                shipping_address: address(),
                payment_method: PaymentMethod::CashOnDelivery,
                items,
                coupon_code: None,
            },
            &pricing,
            Actor::new("ada@example.com"),
            Timestamp::UNIX_EPOCH,
        )?)
    }

    #[test]
    fn place_creates_pending_order_with_one_event() -> TestResult {
        let order = placed_order()?;

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.history().len(), 1);
        assert_eq!(order.payment_status(), PaymentStatus::Pending);
        assert_eq!(order.totals().total, dec!(40.75));
        assert_eq!(order.totals().tax, dec!(5.75));
        assert_eq!(order.currency(), iso::PLN);

        Ok(())
    }

    #[test]
    fn place_rejects_empty_items() -> TestResult {
        let config = PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)?;
        let pricing = price_order(
            &[CartLine::new("GROUT-GREY", dec!(5), 1)],
            None,
            &config,
            Timestamp::UNIX_EPOCH,
        )?;

        let result = Order::place(
            PlaceOrder {
                number: OrderNumber::generate(Timestamp::UNIX_EPOCH, 2),
                customer_email: "ada@example.com".to_string(),
                shipping_address: address(),
                payment_method: PaymentMethod::Card,
                items: Vec::new(),
                coupon_code: None,
            },
            &pricing,
            staff(),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(PlaceOrderError::NoItems));

        Ok(())
    }

    #[test]
    fn place_rejects_items_that_were_not_priced() -> TestResult {
        let config = PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)?;
        let pricing = price_order(
            &[CartLine::new("GROUT-GREY", dec!(5), 1)],
            None,
            &config,
            Timestamp::UNIX_EPOCH,
        )?;

        let result = Order::place(
            PlaceOrder {
                number: OrderNumber::generate(Timestamp::UNIX_EPOCH, 3),
                customer_email: "ada@example.com".to_string(),
                shipping_address: address(),
                payment_method: PaymentMethod::Card,
                items: vec![OrderLineItem::snapshot(
                    &CartLine::new("GROUT-GREY", dec!(5), 2),
                    "Grout",
                )],
                coupon_code: None,
            },
            &pricing,
            staff(),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(
            result,
            Err(PlaceOrderError::SubtotalMismatch {
                items: dec!(10),
                pricing: dec!(5),
            })
        );

        Ok(())
    }

    #[test]
    fn place_rejects_items_too_large_to_total() -> TestResult {
        let config = PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)?;
        let pricing = price_order(
            &[CartLine::new("GROUT-GREY", dec!(5), 1)],
            None,
            &config,
            Timestamp::UNIX_EPOCH,
        )?;

        let result = Order::place(
            PlaceOrder {
                number: OrderNumber::generate(Timestamp::UNIX_EPOCH, 4),
                customer_email: "ada@example.com".to_string(),
                shipping_address: address(),
                payment_method: PaymentMethod::Card,
                items: vec![OrderLineItem::snapshot(
                    &CartLine::new("GROUT-GREY", Decimal::MAX, 3),
                    "Grout",
                )],
                coupon_code: None,
            },
            &pricing,
            staff(),
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(result, Err(PlaceOrderError::ItemsOverflow));

        Ok(())
    }

    #[test]
    fn totals_round_each_field_on_its_own() -> TestResult {
        let config = PricingConfig::new(dec!(0.23), dec!(100), dec!(10), iso::PLN)?;
        let coupon = Coupon::new("SPRING15", DiscountType::Percentage, dec!(15));
        let pricing = price_order(
            &[CartLine::new("GROUT-GREY", dec!(10.05), 1)],
            Some(&coupon),
            &config,
            Timestamp::UNIX_EPOCH,
        )?;

        let totals = OrderTotals::from(&pricing);

        assert_eq!(
            totals,
            OrderTotals {
                subtotal: dec!(10.05),
                discount: dec!(1.51),
                tax: dec!(1.96),
                shipping_fee: dec!(10),
                total: dec!(20.51),
            }
        );
        assert_eq!(
            totals.subtotal - totals.discount + totals.tax + totals.shipping_fee,
            dec!(20.50)
        );

        Ok(())
    }

    #[test]
    fn card_orders_are_paid_on_placement() {
        assert_eq!(
            PaymentMethod::Card.initial_payment_status(),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn apply_transition_appends_one_event() -> TestResult {
        let mut order = placed_order()?;
        let before = order.history().as_slice().to_vec();

        let event = order
            .apply_transition(
                OrderStatus::Confirmed,
                staff(),
                Some("stock checked".to_string()),
                Timestamp::UNIX_EPOCH,
            )?;

        assert_eq!(event.status, OrderStatus::Confirmed);
        assert_eq!(event.updated_by, staff());
        assert_eq!(event.note.as_deref(), Some("stock checked"));
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(order.history().len(), before.len() + 1);
        assert_eq!(order.history().as_slice().get(..before.len()), Some(before.as_slice()));

        Ok(())
    }

    #[test]
    fn invalid_transition_leaves_order_untouched() -> TestResult {
        let mut order = placed_order()?;
        let before = order.clone();

        let result = order.apply_transition(
            OrderStatus::Shipped,
            staff(),
            None,
            Timestamp::UNIX_EPOCH,
        );

        assert_eq!(
            result,
            Err(InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })
        );
        assert_eq!(order, before);

        Ok(())
    }

    #[test]
    fn full_lifecycle_reaches_delivered() -> TestResult {
        let mut order = placed_order()?;

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            order = apply_transition(order, status, staff(), None, Timestamp::UNIX_EPOCH)?;
        }

        assert_eq!(order.status(), OrderStatus::Delivered);
        assert_eq!(order.history().len(), 5);
        assert!(order.valid_next_statuses().is_empty());

        Ok(())
    }

    #[test]
    fn from_parts_round_trips_a_valid_order() -> TestResult {
        let order = apply_transition(
            placed_order()?,
            OrderStatus::Confirmed,
            staff(),
            None,
            Timestamp::UNIX_EPOCH,
        )?;

        let rebuilt = Order::from_parts(parts_of(&order))?;

        assert_eq!(rebuilt, order);

        Ok(())
    }

    #[test]
    fn from_parts_rejects_inconsistent_history() -> TestResult {
        let order = placed_order()?;

        let mut empty = parts_of(&order);
        empty.history.clear();

        let mut mismatch = parts_of(&order);
        mismatch.status = OrderStatus::Shipped;

        let mut illegal = parts_of(&order);
        illegal.history.push(StatusEvent::new(
            OrderStatus::Delivered,
            Timestamp::UNIX_EPOCH,
            staff(),
            None,
        ));
        illegal.status = OrderStatus::Delivered;

        assert!(matches!(
            Order::from_parts(empty),
            Err(CorruptOrder::EmptyHistory(_))
        ));
        assert!(matches!(
            Order::from_parts(mismatch),
            Err(CorruptOrder::StatusMismatch { .. })
        ));
        assert!(matches!(
            Order::from_parts(illegal),
            Err(CorruptOrder::IllegalHistory {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered,
                ..
            })
        ));

        Ok(())
    }

    #[test]
    fn revenue_excludes_cancelled_orders() -> TestResult {
        let kept = placed_order()?;
        let cancelled = apply_transition(
            placed_order()?,
            OrderStatus::Cancelled,
            staff(),
            None,
            Timestamp::UNIX_EPOCH,
        )?;

        assert_eq!(revenue([&kept, &cancelled]), dec!(40.75));

        Ok(())
    }

    fn parts_of(order: &Order) -> OrderParts {
        OrderParts {
            number: order.number().clone(),
            status: order.status(),
            customer_email: order.customer_email().to_string(),
            shipping_address: order.shipping_address().clone(),
            payment_method: order.payment_method(),
            payment_status: order.payment_status(),
            totals: *order.totals(),
            currency: order.currency(),
            coupon_code: order.coupon_code().map(str::to_string),
            items: order.items().to_vec(),
            history: order.history().as_slice().to_vec(),
            placed_at: order.placed_at(),
        }
    }
}
