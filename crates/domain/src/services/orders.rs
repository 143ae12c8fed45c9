//! Order service: creation, lookups, and the joined order listings.

use aggregation::{Pipeline, ProjectField};
use common::{EventId, OrderId, UserId};
use doc_store::{DocumentStore, DocumentStoreExt, Filter, Record};
use serde::Deserialize;
use serde_json::json;

use crate::models::{AdditionalOptions, Event, Order, OrderStatus, UserProfile};
use crate::read_models::{OrderActivity, OrderEventInfo, OrderExpanded};
use crate::services::profile_for_user;
use crate::DomainError;

/// Parameters for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub event_id: EventId,
    #[serde(default)]
    pub additional_options: AdditionalOptions,
}

/// Service for managing orders.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: DocumentStore> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Places an order for the authenticated user against an event.
    ///
    /// Fails with `NotFound` if the user has no profile or the event does
    /// not exist (nothing is written in either case) and with `Conflict`
    /// if an order for the (profile, event) pair already exists. The
    /// duplicate check is advisory; the storage unique index is what
    /// closes the read-then-write race between concurrent creates.
    #[tracing::instrument(skip(self, req), fields(event_id = %req.event_id))]
    pub async fn create_order(&self, user_id: UserId, req: NewOrder) -> Result<Order, DomainError> {
        let profile = profile_for_user(&self.store, user_id).await?;

        if !self
            .store
            .exists(Event::COLLECTION, req.event_id.as_uuid())
            .await?
        {
            return Err(DomainError::NotFound(format!(
                "no event associated with id {}",
                req.event_id
            )));
        }

        let duplicates = self
            .store
            .count(
                Order::COLLECTION,
                Filter::And(vec![
                    Filter::eq("user_profile_id", profile.id.to_string()),
                    Filter::eq("event_id", req.event_id.to_string()),
                ]),
            )
            .await?;
        if duplicates > 0 {
            return Err(DomainError::Conflict(
                "user already has an order for this event".to_string(),
            ));
        }

        let order = Order::new(profile.id, req.event_id, req.additional_options);
        self.store.insert_record(&order).await?;

        metrics::counter!("orders_created").increment(1);
        tracing::info!(order_id = %order.id, "order created");
        Ok(order)
    }

    /// Fetches an order by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get::<Order>(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("no order associated with id {id}")))
    }

    /// Fetches the event an order was placed against.
    #[tracing::instrument(skip(self))]
    pub async fn get_event_for_order(&self, id: OrderId) -> Result<Event, DomainError> {
        let order = self.get_order(id).await?;
        self.store
            .get::<Event>(order.event_id.as_uuid())
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("no event associated with id {}", order.event_id))
            })
    }

    /// Lists the caller's orders joined to their events, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderEventInfo>, DomainError> {
        let profile = profile_for_user(&self.store, user_id).await?;

        let pipeline = Pipeline::collection(Order::COLLECTION)
            .match_on(Filter::eq("user_profile_id", profile.id.to_string()))
            .coerce_id("event_id")
            .lookup(Event::COLLECTION, "event_id", "id", "event")
            .unwind("event")
            .project(vec![
                ProjectField::new("event_id", "event_id"),
                ProjectField::new("event.event_type", "event_type"),
                ProjectField::new("status", "status"),
                ProjectField::new("additional_options", "additional_options"),
                ProjectField::new("rating", "rating"),
                ProjectField::new("created_at", "created_at"),
            ])
            .sort_desc("created_at");

        Ok(pipeline.run_typed(&self.store).await?)
    }

    /// Lists the caller's orders whose event is active (pending or in
    /// progress) or, with `active == false`, completed. Rows carry the
    /// joined event's fields and sort by the event's creation time.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders_by_activity(
        &self,
        user_id: UserId,
        active: bool,
    ) -> Result<Vec<OrderActivity>, DomainError> {
        let profile = profile_for_user(&self.store, user_id).await?;

        let statuses = if active {
            vec![json!("PENDING"), json!("IN_PROGRESS")]
        } else {
            vec![json!("COMPLETED")]
        };

        let pipeline = Pipeline::collection(Order::COLLECTION)
            .match_on(Filter::eq("user_profile_id", profile.id.to_string()))
            .coerce_id("event_id")
            .lookup(Event::COLLECTION, "event_id", "id", "event")
            .unwind("event")
            .match_on(Filter::In("event.status".to_string(), statuses))
            .project(vec![
                ProjectField::new("event.id", "event_id"),
                ProjectField::new("id", "order_id"),
                ProjectField::new("event.title", "title"),
                ProjectField::new("event.description", "description"),
                ProjectField::new("event.group_id", "group_id"),
                ProjectField::new("event.status", "status"),
                ProjectField::new("event.event_type", "event_type"),
                ProjectField::new("event.created_at", "created_at"),
                ProjectField::new("event.pending_until", "pending_until"),
            ])
            .sort_desc("created_at");

        Ok(pipeline.run_typed(&self.store).await?)
    }

    /// Lists all orders placed against an event, joined to the profiles
    /// that placed them. Fails with `NotFound` if the event is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders_for_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<OrderExpanded>, DomainError> {
        if !self
            .store
            .exists(Event::COLLECTION, event_id.as_uuid())
            .await?
        {
            return Err(DomainError::NotFound(format!(
                "no event associated with id {event_id}"
            )));
        }

        let pipeline = Pipeline::collection(Order::COLLECTION)
            .match_on(Filter::eq("event_id", event_id.to_string()))
            .coerce_id("user_profile_id")
            .lookup(UserProfile::COLLECTION, "user_profile_id", "id", "profile")
            .unwind("profile")
            .project(vec![
                ProjectField::new("id", "order_id"),
                ProjectField::new("user_profile_id", "user_profile_id"),
                ProjectField::new("profile.first_name", "first_name"),
                ProjectField::new("profile.last_name", "last_name"),
                ProjectField::new("additional_options", "additional_options"),
                ProjectField::new("status", "status"),
                ProjectField::new("created_at", "created_at"),
            ])
            .sort_desc("created_at");

        Ok(pipeline.run_typed(&self.store).await?)
    }

    /// Sets an order's status. Fails with `NotFound` if the order is absent.
    #[tracing::instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let mut order = self.get_order(id).await?;
        order.status = status;
        self.store.save_record(&order).await?;

        tracing::info!(order_id = %id, %status, "order status updated");
        Ok(order)
    }

    /// Rates the caller's own order (0–5) and credits the brew to the
    /// caller's profile score.
    #[tracing::instrument(skip(self))]
    pub async fn rate_order(
        &self,
        user_id: UserId,
        id: OrderId,
        rating: u8,
    ) -> Result<Order, DomainError> {
        if rating > 5 {
            return Err(DomainError::Validation(format!(
                "rating must be between 0 and 5, got {rating}"
            )));
        }

        let profile = profile_for_user(&self.store, user_id).await?;
        let mut order = self.get_order(id).await?;
        if order.user_profile_id != profile.id {
            return Err(DomainError::Unauthorized(
                "order belongs to another profile".to_string(),
            ));
        }

        order.rating = Some(rating);
        self.store.save_record(&order).await?;

        let mut profile = profile;
        profile.score += i64::from(rating);
        self.store.save_record(&profile).await?;

        Ok(order)
    }
}
