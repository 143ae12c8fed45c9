//! Shared types used across the coffee-ordering backend.

pub mod types;

pub use types::{BrewEventId, EventId, GroupId, OrderId, ProfileId, UserId};
