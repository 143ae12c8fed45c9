//! Event service: creation, search, completion, and the status sweep.

use chrono::{DateTime, Utc};
use common::{EventId, GroupId, UserId};
use doc_store::{DocumentStore, DocumentStoreExt, Filter, Record};
use serde::Deserialize;

use crate::models::{Event, EventStatus, EventType, Group};
use crate::services::profile_for_user;
use crate::sweep::{SweepReport, sweep_due};
use crate::DomainError;

/// Longest allowed event description.
const MAX_DESCRIPTION_LEN: usize = 120;

/// Parameters for creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    pub group_id: GroupId,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub event_type: EventType,
    pub pending_until: DateTime<Utc>,
}

/// Predicate-driven event search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSearch {
    pub group_id: Option<GroupId>,
    pub status: Option<EventStatus>,
    pub event_type: Option<EventType>,
}

/// Service for managing brew events.
#[derive(Clone)]
pub struct EventService<S> {
    store: S,
}

impl<S: DocumentStore> EventService<S> {
    /// Creates a new event service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a pending event on behalf of the authenticated user.
    #[tracing::instrument(skip(self, req))]
    pub async fn create_event(&self, user_id: UserId, req: NewEvent) -> Result<Event, DomainError> {
        if req.title.trim().is_empty() {
            return Err(DomainError::Validation("title is required".to_string()));
        }
        if req.description.len() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::Validation(format!(
                "description exceeds {MAX_DESCRIPTION_LEN} characters"
            )));
        }

        let profile = profile_for_user(&self.store, user_id).await?;
        if !self
            .store
            .exists(Group::COLLECTION, req.group_id.as_uuid())
            .await?
        {
            return Err(DomainError::NotFound(format!(
                "no group associated with id {}",
                req.group_id
            )));
        }

        let event = Event::new(
            profile.id,
            req.group_id,
            req.title,
            req.description,
            req.event_type,
            req.pending_until,
        );
        self.store.insert_record(&event).await?;

        metrics::counter!("events_created").increment(1);
        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }

    /// Fetches an event by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_event(&self, id: EventId) -> Result<Event, DomainError> {
        self.store
            .get::<Event>(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no event associated with id {id}")))
    }

    /// Lists events matching the search predicate, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn search_events(&self, search: EventSearch) -> Result<Vec<Event>, DomainError> {
        let mut filters = Vec::new();
        if let Some(group_id) = search.group_id {
            filters.push(Filter::eq("group_id", group_id.to_string()));
        }
        if let Some(status) = search.status {
            filters.push(Filter::eq("status", status.as_str()));
        }
        if let Some(event_type) = search.event_type {
            filters.push(Filter::eq("event_type", event_type.as_str()));
        }
        let filter = if filters.is_empty() {
            Filter::All
        } else {
            Filter::And(filters)
        };

        let mut events: Vec<Event> = self.store.find_records(filter).await?;
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    /// Completes an in-progress event, stamping `completed_at`.
    ///
    /// The lifecycle is monotonic: a pending event cannot jump straight to
    /// completed, and a completed event is immutable.
    #[tracing::instrument(skip(self))]
    pub async fn complete_event(&self, id: EventId) -> Result<Event, DomainError> {
        let mut event = self.get_event(id).await?;
        if !event.status.can_transition_to(EventStatus::Completed) {
            return Err(DomainError::Conflict(format!(
                "cannot complete event in status {}",
                event.status
            )));
        }

        event.status = EventStatus::Completed;
        event.completed_at = Some(Utc::now());
        self.store.save_record(&event).await?;

        tracing::info!(event_id = %id, "event completed");
        Ok(event)
    }

    /// Runs one status sweep: promotes due pending events (and brew
    /// events) to in-progress. The periodic job and the manual trigger
    /// both land here.
    #[tracing::instrument(skip(self))]
    pub async fn run_status_sweep(&self) -> Result<SweepReport, DomainError> {
        sweep_due(&self.store, Utc::now()).await
    }
}
