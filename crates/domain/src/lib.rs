//! Domain layer: entities, read models, services, and the status sweep.
//!
//! Services enforce the business invariants (existence checks, one order
//! per user per event, monotonic status lifecycles) and orchestrate the
//! persistence gateway and the aggregation engine. The API layer above
//! performs no business-rule evaluation of its own.

pub mod error;
pub mod models;
pub mod read_models;
pub mod services;
pub mod sweep;

pub use error::DomainError;
pub use models::{
    AdditionalOptions, BrewEvent, Event, EventStatus, EventType, Group, Order, OrderStatus, User,
    UserProfile,
};
pub use read_models::{BrewEventRow, OrderActivity, OrderEventInfo, OrderExpanded};
pub use services::{
    brew_events::BrewEventService,
    events::{EventSearch, EventService, NewEvent},
    groups::{GroupService, NewGroup},
    orders::{NewOrder, OrderService},
    users::{NewProfile, Registration, UserService},
};
pub use sweep::{SweepReport, sweep_due};
