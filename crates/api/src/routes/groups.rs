//! Group endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::GroupId;
use doc_store::DocumentStore;
use domain::{Group, NewGroup};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::AppState;

/// POST /api/groups — create a group owned by the caller.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<NewGroup>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let group = state.group_service.create_group(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /api/groups/:id — fetch a group.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Group>, ApiError> {
    let group = state.group_service.get_group(GroupId::from(id)).await?;
    Ok(Json(group))
}
