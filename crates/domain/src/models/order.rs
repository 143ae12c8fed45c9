use chrono::{DateTime, Utc};
use common::{EventId, OrderId, ProfileId};
use doc_store::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderStatus;

/// How the coffee should be prepared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AdditionalOptions {
    pub sugar_quantity: u32,
    pub milk_quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One user's request attached to an event.
///
/// At most one order per (profile, event) pair; both foreign keys must
/// resolve at creation time. Never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_profile_id: ProfileId,
    pub event_id: EventId,
    pub additional_options: AdditionalOptions,
    /// 0–5, set by the drinker after the fact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order for a profile against an event.
    pub fn new(user_profile_id: ProfileId, event_id: EventId, options: AdditionalOptions) -> Self {
        Self {
            id: OrderId::new(),
            user_profile_id,
            event_id,
            additional_options: options,
            rating: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> Uuid {
        self.id.as_uuid()
    }
}
