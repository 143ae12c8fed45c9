//! User and profile endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::UserId;
use doc_store::DocumentStore;
use domain::{NewProfile, UserProfile};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::routes::auth::UserResponse;
use crate::AppState;

/// GET /api/users/:id — fetch a single user.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(UserId::from(id)).await?;
    Ok(Json(user.into()))
}

/// GET /api/users — list all users.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/profiles — create the caller's group profile.
#[tracing::instrument(skip(state, req))]
pub async fn create_profile<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<NewProfile>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let profile = state.user_service.create_profile(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
