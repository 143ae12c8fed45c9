//! Brew event endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{BrewEventId, OrderId};
use doc_store::DocumentStore;
use domain::{BrewEvent, BrewEventRow};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct NewBrewEventRequest {
    pub start_time: DateTime<Utc>,
}

/// POST /api/brew-events — start a brew session for the caller.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<NewBrewEventRequest>,
) -> Result<(StatusCode, Json<BrewEvent>), ApiError> {
    let event = state
        .brew_event_service
        .create_brew_event(user_id, req.start_time)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /api/brew-events — the caller's brew history, newest first.
#[tracing::instrument(skip(state))]
pub async fn history<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<BrewEvent>>, ApiError> {
    let events = state.brew_event_service.history_for_user(user_id).await?;
    Ok(Json(events))
}

/// GET /api/brew-events/pending — pending sessions started by others.
#[tracing::instrument(skip(state))]
pub async fn pending<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<BrewEventRow>>, ApiError> {
    let rows = state.brew_event_service.pending_for_others(user_id).await?;
    Ok(Json(rows))
}

/// POST /api/brew-events/:id/orders/:order_id — attach an order to a
/// brew session.
#[tracing::instrument(skip(state))]
pub async fn attach_order<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<BrewEvent>, ApiError> {
    let event = state
        .brew_event_service
        .attach_order(BrewEventId::from(id), OrderId::from(order_id))
        .await?;
    Ok(Json(event))
}
