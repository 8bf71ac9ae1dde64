//! Order Numbers

use std::{fmt, str::FromStr};

use jiff::{Timestamp, tz::TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PREFIX: &str = "TS";
const SUFFIX_MASK: u32 = 0x00FF_FFFF;

/// Malformed order number.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid order number: {0}")]
pub struct InvalidOrderNumber(pub String);

/// Human-facing order reference, e.g. `TS-20261018-4F2A9C`.
///
/// The date is the UTC placement date; the suffix is six hex digits of caller supplied
/// entropy. Uniqueness is enforced by the order store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number for an order placed at `placed_at`.
    pub fn generate(placed_at: Timestamp, entropy: u32) -> Self {
        let date = placed_at.to_zoned(TimeZone::UTC).date();

        Self(format!(
            "{PREFIX}-{:04}{:02}{:02}-{:06X}",
            date.year(),
            date.month(),
            date.day(),
            entropy & SUFFIX_MASK
        ))
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = InvalidOrderNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let mut parts = normalized.split('-');

        let valid = matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some(PREFIX), Some(date), Some(suffix), None)
                if date.len() == 8
                    && date.chars().all(|c| c.is_ascii_digit())
                    && suffix.len() == 6
                    && suffix.chars().all(|c| c.is_ascii_hexdigit())
        );

        if valid {
            Ok(Self(normalized))
        } else {
            Err(InvalidOrderNumber(s.to_string()))
        }
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = InvalidOrderNumber;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}
