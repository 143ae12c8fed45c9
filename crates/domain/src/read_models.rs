//! Typed rows produced by the aggregation pipelines.
//!
//! Each struct is the fixed projection shape of one canonical pipeline;
//! field names match the projection targets exactly.

use chrono::{DateTime, Utc};
use common::{BrewEventId, EventId, GroupId, OrderId, ProfileId, UserId};
use serde::{Deserialize, Serialize};

use crate::models::{AdditionalOptions, EventStatus, EventType, OrderStatus};

/// An order joined to its event: the caller's order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEventInfo {
    pub event_id: EventId,
    pub event_type: EventType,
    pub status: OrderStatus,
    pub additional_options: AdditionalOptions,
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// An order's event, filtered by the event's activity status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderActivity {
    pub event_id: EventId,
    pub order_id: OrderId,
    pub title: String,
    pub description: String,
    pub group_id: GroupId,
    pub status: EventStatus,
    pub event_type: EventType,
    pub created_at: DateTime<Utc>,
    pub pending_until: DateTime<Utc>,
}

/// An order joined to the profile that placed it: an event's order sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderExpanded {
    pub order_id: OrderId,
    pub user_profile_id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub additional_options: AdditionalOptions,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A pending brew event of some other user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewEventRow {
    pub event_id: BrewEventId,
    pub user_id: UserId,
    pub status: EventStatus,
}
