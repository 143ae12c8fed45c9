//! HTTP route handlers.

pub mod auth;
pub mod brew_events;
pub mod events;
pub mod groups;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod users;
