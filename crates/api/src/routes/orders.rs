//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::OrderId;
use doc_store::DocumentStore;
use domain::{Event, NewOrder, Order, OrderActivity, OrderEventInfo, OrderStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct RateOrderRequest {
    pub order_id: Uuid,
    pub rating: u8,
}

// -- Handlers --

/// POST /api/orders — place an order for the caller.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let order = state.order_service.create_order(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/:id — fetch a single order.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state.order_service.get_order(OrderId::from(id)).await?;
    Ok(Json(order))
}

/// GET /api/orders — the caller's order history joined to events.
#[tracing::instrument(skip(state))]
pub async fn list_mine<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<OrderEventInfo>>, ApiError> {
    let rows = state.order_service.list_orders_for_user(user_id).await?;
    Ok(Json(rows))
}

/// GET /api/orders/activity?active= — the caller's orders filtered by
/// whether the joined event is still active.
#[tracing::instrument(skip(state))]
pub async fn activity<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<OrderActivity>>, ApiError> {
    let rows = state
        .order_service
        .list_orders_by_activity(user_id, query.active)
        .await?;
    Ok(Json(rows))
}

/// GET /api/orders/:id/event — the event an order was placed against.
#[tracing::instrument(skip(state))]
pub async fn event<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .order_service
        .get_event_for_order(OrderId::from(id))
        .await?;
    Ok(Json(event))
}

/// PATCH /api/orders/:id/status — set an order's status.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .order_service
        .update_order_status(OrderId::from(id), req.status)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/rating — rate one of the caller's own orders.
#[tracing::instrument(skip(state, req))]
pub async fn rate<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<RateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .order_service
        .rate_order(user_id, OrderId::from(req.order_id), req.rating)
        .await?;
    Ok(Json(order))
}
