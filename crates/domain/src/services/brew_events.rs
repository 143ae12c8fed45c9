//! Brew event service.
//!
//! Brew events are lighter than [`crate::models::Event`]: they belong to a
//! single user, accumulate order ids directly, and are promoted by the
//! sweep once their `start_time` passes.

use aggregation::{Pipeline, ProjectField};
use chrono::{DateTime, Utc};
use common::{BrewEventId, OrderId, UserId};
use doc_store::{DocumentStore, DocumentStoreExt, Filter, Record};
use serde_json::json;

use crate::models::BrewEvent;
use crate::read_models::BrewEventRow;
use crate::DomainError;

/// Service for managing per-user brew sessions.
#[derive(Clone)]
pub struct BrewEventService<S> {
    store: S,
}

impl<S: DocumentStore> BrewEventService<S> {
    /// Creates a new brew event service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Starts a pending brew session for the authenticated user.
    #[tracing::instrument(skip(self))]
    pub async fn create_brew_event(
        &self,
        user_id: UserId,
        start_time: DateTime<Utc>,
    ) -> Result<BrewEvent, DomainError> {
        let event = BrewEvent::new(user_id, start_time);
        self.store.insert_record(&event).await?;

        metrics::counter!("brew_events_created").increment(1);
        tracing::info!(brew_event_id = %event.id, "brew event created");
        Ok(event)
    }

    /// Attaches an order to a brew session. Idempotent per order id.
    #[tracing::instrument(skip(self))]
    pub async fn attach_order(
        &self,
        id: BrewEventId,
        order_id: OrderId,
    ) -> Result<BrewEvent, DomainError> {
        let mut event = self.get_brew_event(id).await?;
        if !event.order_ids.contains(&order_id) {
            event.order_ids.push(order_id);
            self.store.save_record(&event).await?;
        }
        Ok(event)
    }

    /// Fetches a brew event by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_brew_event(&self, id: BrewEventId) -> Result<BrewEvent, DomainError> {
        self.store
            .get::<BrewEvent>(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no brew event associated with id {id}")))
    }

    /// Lists the caller's brew sessions, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn history_for_user(&self, user_id: UserId) -> Result<Vec<BrewEvent>, DomainError> {
        let mut events: Vec<BrewEvent> = self
            .store
            .find_records(Filter::eq("user_id", user_id.to_string()))
            .await?;
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    /// Lists pending brew sessions started by anyone but the caller:
    /// the "someone else is brewing" feed.
    #[tracing::instrument(skip(self))]
    pub async fn pending_for_others(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BrewEventRow>, DomainError> {
        let rows = Pipeline::collection(BrewEvent::COLLECTION)
            .match_on(Filter::And(vec![
                Filter::Ne("user_id".into(), json!(user_id.to_string())),
                Filter::eq("status", "PENDING"),
            ]))
            .project(vec![
                ProjectField::new("id", "event_id"),
                ProjectField::new("user_id", "user_id"),
                ProjectField::new("status", "status"),
            ])
            .sort_desc("created_at")
            .run_typed(&self.store)
            .await?;
        Ok(rows)
    }
}
