use chrono::{DateTime, Utc};
use common::{BrewEventId, OrderId, UserId};
use doc_store::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EventStatus;

/// A brew session tracking the orders it accumulates.
///
/// Unlike [`super::Event`], a brew event references its orders directly;
/// order ids are appended as users join. The sweep promotes it by
/// `start_time`, independently of the events collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewEvent {
    pub id: BrewEventId,
    pub user_id: UserId,
    pub status: EventStatus,
    pub start_time: DateTime<Utc>,
    pub order_ids: Vec<OrderId>,
    pub created_at: DateTime<Utc>,
}

impl BrewEvent {
    /// Creates a pending brew session starting at `start_time`.
    pub fn new(user_id: UserId, start_time: DateTime<Utc>) -> Self {
        Self {
            id: BrewEventId::new(),
            user_id,
            status: EventStatus::Pending,
            start_time,
            order_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl Record for BrewEvent {
    const COLLECTION: &'static str = "brew_events";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
