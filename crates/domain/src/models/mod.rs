//! Persisted entities and their lifecycle enums.

mod brew_event;
mod event;
mod group;
mod order;
mod status;
mod user;

pub use brew_event::BrewEvent;
pub use event::{Event, EventType};
pub use group::Group;
pub use order::{AdditionalOptions, Order};
pub use status::{EventStatus, OrderStatus};
pub use user::{User, UserProfile};
