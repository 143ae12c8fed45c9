//! Registration and login endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, StatusCode, header};
use chrono::{DateTime, Utc};
use doc_store::DocumentStore;
use domain::{Registration, User};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::{AppState, SESSION_COOKIE};

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -- Response types --

/// Public view of a user; the stored password hash never leaves the server.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub coffee_count: u32,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            coffee_count: user.coffee_count,
            score: user.score,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
}

// -- Handlers --

/// POST /api/auth/register — create a new account.
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .register(Registration {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/auth/login — verify credentials and start a session.
///
/// The token is returned both in the body (for bearer clients) and as an
/// HttpOnly cookie (for browsers).
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn login<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<LoginRequest>,
) -> Result<([(HeaderName, String); 1], Json<LoginResponse>), ApiError> {
    let user = state
        .user_service
        .verify_credentials(&req.email, &req.password)
        .await?;

    let token = state
        .tokens
        .issue(user.id, &user.email)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        state.session_ttl_seconds
    );

    tracing::info!(user_id = %user.id, "login succeeded");
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token,
            user_id: user.id.to_string(),
        }),
    ))
}
