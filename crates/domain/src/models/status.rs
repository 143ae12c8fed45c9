//! Status lifecycles.

use serde::{Deserialize, Serialize};

/// The state of a brew event.
///
/// Transitions are monotonic:
/// ```text
/// Pending ──► InProgress ──► Completed
/// ```
/// The sweep promotes Pending→InProgress when the scheduled start time has
/// passed; completion is an explicit service call. A Completed event is
/// immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl EventStatus {
    /// Returns true if the lifecycle allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Pending, EventStatus::InProgress)
                | (EventStatus::InProgress, EventStatus::Completed)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed)
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "PENDING",
            EventStatus::InProgress => "IN_PROGRESS",
            EventStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state of an order, mirroring the event lifecycle names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl OrderStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_pending() {
        assert_eq!(EventStatus::default(), EventStatus::Pending);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn transitions_are_monotonic() {
        assert!(EventStatus::Pending.can_transition_to(EventStatus::InProgress));
        assert!(EventStatus::InProgress.can_transition_to(EventStatus::Completed));

        assert!(!EventStatus::Pending.can_transition_to(EventStatus::Completed));
        assert!(!EventStatus::InProgress.can_transition_to(EventStatus::Pending));
        assert!(!EventStatus::Completed.can_transition_to(EventStatus::Pending));
        assert!(!EventStatus::Completed.can_transition_to(EventStatus::InProgress));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!EventStatus::Pending.is_terminal());
        assert!(!EventStatus::InProgress.is_terminal());
        assert!(EventStatus::Completed.is_terminal());
    }

    #[test]
    fn serializes_as_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&EventStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        let parsed: EventStatus = serde_json::from_str("\"PENDING\"").unwrap();
        assert_eq!(parsed, EventStatus::Pending);
    }
}
