//! Event endpoints, including the order sheet and the manual sweep.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::EventId;
use doc_store::DocumentStore;
use domain::{Event, EventSearch, NewEvent, OrderExpanded, SweepReport};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::AppState;

/// POST /api/events — schedule a new event.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.event_service.create_event(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/events/:id — fetch an event.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = state.event_service.get_event(EventId::from(id)).await?;
    Ok(Json(event))
}

/// POST /api/events/search — list events matching a predicate.
#[tracing::instrument(skip(state, search))]
pub async fn search<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Json(search): Json<EventSearch>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.event_service.search_events(search).await?;
    Ok(Json(events))
}

/// GET /api/events/:id/orders — the event's order sheet, joined to the
/// profiles that placed the orders.
#[tracing::instrument(skip(state))]
pub async fn orders<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<OrderExpanded>>, ApiError> {
    let sheet = state
        .order_service
        .list_orders_for_event(EventId::from(id))
        .await?;
    Ok(Json(sheet))
}

/// POST /api/events/:id/complete — close out an in-progress event.
#[tracing::instrument(skip(state))]
pub async fn complete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError> {
    let event = state.event_service.complete_event(EventId::from(id)).await?;
    Ok(Json(event))
}

/// POST /api/events/sweep — trigger one status sweep pass immediately.
#[tracing::instrument(skip(state))]
pub async fn sweep<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
) -> Result<Json<SweepReport>, ApiError> {
    let report = state.event_service.run_status_sweep().await?;
    Ok(Json(report))
}
