//! Order Status
//!
//! The lifecycle an order moves through after checkout:
//!
//! ```text
//! Pending → Confirmed → Processing → Shipped → Delivered
//!    │          │            │
//!    └──────────┴────────────┴──────→ Cancelled
//! ```
//!
//! `Pending` is only ever the initial state. `Delivered` and `Cancelled` are terminal.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Statuses reachable from a given status. Never more than two.
pub type StatusSet = SmallVec<[OrderStatus; 2]>;

/// An unrecognised status string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed by the customer, awaiting staff confirmation.
    Pending,

    /// Accepted by staff.
    Confirmed,

    /// Being picked and packed.
    Processing,

    /// Handed to the carrier.
    Shipped,

    /// Received by the customer.
    Delivered,

    /// Abandoned before shipping.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses an order may move to from this one.
    pub const fn transitions(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    /// Whether no further transitions are possible.
    pub const fn is_terminal(self) -> bool {
        self.transitions().is_empty()
    }

    /// Storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();

        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Statuses reachable from `current`, used to decide which staff actions to offer.
pub fn valid_next_statuses(current: OrderStatus) -> StatusSet {
    SmallVec::from_slice(current.transitions())
}

/// Whether an order in `from` may move to `to`.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    from.transitions().contains(&to)
}
