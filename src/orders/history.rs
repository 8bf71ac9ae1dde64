//! Status History

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::orders::status::OrderStatus;

/// Identity of whoever changed an order's status (staff e-mail, or the customer at
/// checkout).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Creates a new actor.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Status the order moved into.
    pub status: OrderStatus,

    /// When the change happened.
    pub timestamp: Timestamp,

    /// Who made the change.
    pub updated_by: Actor,

    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StatusEvent {
    /// Creates a new status event. Blank notes are dropped.
    pub fn new(
        status: OrderStatus,
        timestamp: Timestamp,
        updated_by: Actor,
        note: Option<String>,
    ) -> Self {
        Self {
            status,
            timestamp,
            updated_by,
            note: note.filter(|note| !note.trim().is_empty()),
        }
    }
}

/// Append-only log of status changes, oldest first.
///
/// Entries can only be added at the end; there is no way to edit, reorder or remove them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusHistory(Vec<StatusEvent>);

impl StatusHistory {
    /// Start a history with its first event.
    pub fn starting_with(event: StatusEvent) -> Self {
        Self(vec![event])
    }

    pub(crate) fn from_events(events: Vec<StatusEvent>) -> Self {
        Self(events)
    }

    pub(crate) fn append(&mut self, event: StatusEvent) {
        self.0.push(event);
    }

    /// Number of recorded changes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for histories attached to an order.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The oldest event.
    pub fn first(&self) -> Option<&StatusEvent> {
        self.0.first()
    }

    /// The most recent event.
    pub fn latest(&self) -> Option<&StatusEvent> {
        self.0.last()
    }

    /// Iterate events oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, StatusEvent> {
        self.0.iter()
    }

    /// Events as a slice, oldest first.
    pub fn as_slice(&self) -> &[StatusEvent] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a StatusHistory {
    type Item = &'a StatusEvent;
    type IntoIter = std::slice::Iter<'a, StatusEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(status: OrderStatus, second: i64) -> StatusEvent {
        StatusEvent::new(
            status,
            Timestamp::from_second(second).unwrap_or(Timestamp::UNIX_EPOCH),
            Actor::new("staff@tessera.example"),
            None,
        )
    }

    #[test]
    fn append_keeps_order() {
        let mut history = StatusHistory::starting_with(event(OrderStatus::Pending, 1));

        history.append(event(OrderStatus::Confirmed, 2));
        history.append(event(OrderStatus::Processing, 3));

        let statuses: Vec<_> = history.iter().map(|event| event.status).collect();

        assert_eq!(
            statuses,
            [
                OrderStatus::Pending,
                OrderStatus::Confirmed,
                OrderStatus::Processing
            ]
        );
        assert_eq!(
            history.first().map(|event| event.status),
            Some(OrderStatus::Pending)
        );
        assert_eq!(
            history.latest().map(|event| event.status),
            Some(OrderStatus::Processing)
        );
    }

    #[test]
    fn blank_notes_are_dropped() {
        let blank = StatusEvent::new(
            OrderStatus::Cancelled,
            Timestamp::UNIX_EPOCH,
            Actor::new("staff@tessera.example"),
            Some("   ".to_string()),
        );

        assert_eq!(blank.note, None);
    }

    #[test]
    fn serializes_as_plain_list() -> testresult::TestResult {
        let history = StatusHistory::starting_with(event(OrderStatus::Pending, 0));

        let yaml = serde_norway::to_string(&history)?;

        assert!(yaml.starts_with("- status: pending"), "unexpected yaml: {yaml}");

        Ok(())
    }
}
