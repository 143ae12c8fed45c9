//! HTTP API server with observability for the coffee-ordering backend.
//!
//! Provides REST endpoints for users, groups, events, orders, and brew
//! events, with structured logging (tracing) and Prometheus metrics.
//! Handlers are thin: all business rules live in the `domain` crate.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use auth::{JwtConfig, JwtManager, TokenIssuer};
use axum::Router;
use axum::routing::{get, patch, post, put};
use doc_store::DocumentStore;
use domain::{BrewEventService, EventService, GroupService, OrderService, UserService};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Name of the session cookie set at login.
pub const SESSION_COOKIE: &str = "kava_session";

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub user_service: UserService<S>,
    pub group_service: GroupService<S>,
    pub event_service: EventService<S>,
    pub order_service: OrderService<S>,
    pub brew_event_service: BrewEventService<S>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub session_ttl_seconds: u64,
    pub store: S,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/api/auth/register", post(routes::auth::register::<S>))
        .route("/api/auth/login", post(routes::auth::login::<S>))
        .route("/api/users", get(routes::users::list::<S>))
        .route("/api/users/{id}", get(routes::users::get::<S>))
        .route("/api/profiles", post(routes::users::create_profile::<S>))
        .route("/api/groups", post(routes::groups::create::<S>))
        .route("/api/groups/{id}", get(routes::groups::get::<S>))
        .route("/api/events", post(routes::events::create::<S>))
        .route("/api/events/search", post(routes::events::search::<S>))
        .route("/api/events/sweep", post(routes::events::sweep::<S>))
        .route("/api/events/{id}", get(routes::events::get::<S>))
        .route("/api/events/{id}/orders", get(routes::events::orders::<S>))
        .route(
            "/api/events/{id}/complete",
            post(routes::events::complete::<S>),
        )
        .route("/api/orders", post(routes::orders::create::<S>))
        .route("/api/orders", get(routes::orders::list_mine::<S>))
        .route("/api/orders/activity", get(routes::orders::activity::<S>))
        .route("/api/orders/rating", put(routes::orders::rate::<S>))
        .route("/api/orders/{id}", get(routes::orders::get::<S>))
        .route("/api/orders/{id}/event", get(routes::orders::event::<S>))
        .route(
            "/api/orders/{id}/status",
            patch(routes::orders::update_status::<S>),
        )
        .route("/api/brew-events", post(routes::brew_events::create::<S>))
        .route("/api/brew-events", get(routes::brew_events::history::<S>))
        .route(
            "/api/brew-events/pending",
            get(routes::brew_events::pending::<S>),
        )
        .route(
            "/api/brew-events/{id}/orders/{order_id}",
            post(routes::brew_events::attach_order::<S>),
        )
        .route("/health", get(routes::health::check))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given store.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(
    store: S,
    jwt: JwtConfig,
) -> Arc<AppState<S>> {
    let manager = JwtManager::new(jwt);
    let session_ttl_seconds = manager.expiration_seconds();

    Arc::new(AppState {
        user_service: UserService::new(store.clone()),
        group_service: GroupService::new(store.clone()),
        event_service: EventService::new(store.clone()),
        order_service: OrderService::new(store.clone()),
        brew_event_service: BrewEventService::new(store.clone()),
        tokens: Arc::new(manager),
        session_ttl_seconds,
        store,
    })
}
