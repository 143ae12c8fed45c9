use chrono::{DateTime, Utc};
use common::{EventId, GroupId, ProfileId};
use doc_store::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventStatus;

/// What is being brewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[default]
    Coffee,
    Food,
    Beverage,
    Other,
}

impl EventType {
    /// Wire-format name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Coffee => "COFFEE",
            EventType::Food => "FOOD",
            EventType::Beverage => "BEVERAGE",
            EventType::Other => "OTHER",
        }
    }
}

/// A scheduled group brewing session with a monotonic status lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Profile of the member who created the event.
    pub creator_id: ProfileId,
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    pub status: EventStatus,
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
    /// Scheduled start: the sweep promotes the event to IN_PROGRESS once
    /// this instant has passed.
    pub pending_until: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Event {
    /// Creates a pending event scheduled to start at `pending_until`.
    pub fn new(
        creator_id: ProfileId,
        group_id: GroupId,
        title: impl Into<String>,
        description: impl Into<String>,
        event_type: EventType,
        pending_until: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            creator_id,
            group_id,
            title: title.into(),
            description: description.into(),
            status: EventStatus::Pending,
            event_type,
            created_at: Utc::now(),
            pending_until,
            completed_at: None,
        }
    }
}

impl Record for Event {
    const COLLECTION: &'static str = "events";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
