//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use auth::JwtConfig;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use doc_store::InMemoryDocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, Arc<api::AppState<InMemoryDocumentStore>>) {
    let store = InMemoryDocumentStore::new();
    let jwt = JwtConfig::new("integration-test-secret-long-enough");
    let state = api::create_default_state(store, jwt);
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn authed(mut req: Request<Body>, token: &str) -> Request<Body> {
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    req
}

/// Registers a user, logs in, and returns the bearer token.
async fn register_and_login(app: &axum::Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({
                "email": email,
                "password": "espresso123",
                "first_name": "Ana",
                "last_name": "Horvat",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": email, "password": "espresso123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login must set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("kava_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

/// Creates a group, the caller's profile in it, and a pending event.
/// Returns (group_id, event_id).
async fn seed_group_profile_event(app: &axum::Router, token: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/groups",
                serde_json::json!({ "name": "roastery", "description": "second floor" }),
            ),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let group_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/profiles",
                serde_json::json!({
                    "group_id": group_id,
                    "first_name": "Ana",
                    "last_name": "Horvat",
                }),
            ),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/events",
                serde_json::json!({
                    "group_id": group_id,
                    "title": "morning brew",
                    "description": "first round",
                    "event_type": "COFFEE",
                    "pending_until": "2027-01-01T10:00:00Z",
                }),
            ),
            token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

    (group_id, event_id)
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_cookie_auth() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;

    // Cookie alone must authenticate a protected route.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::COOKIE, format!("kava_session={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let users = body_json(response).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["email"], "ana@example.com");
    assert!(users[0].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let (app, _) = setup();
    register_and_login(&app, "ana@example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({
                "email": "ana@example.com",
                "password": "espresso123",
                "first_name": "Ana",
                "last_name": "Horvat",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_short_password_is_bad_request() {
    let (app, _) = setup();

    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            serde_json::json!({
                "email": "ana@example.com",
                "password": "short",
                "first_name": "Ana",
                "last_name": "Horvat",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let (app, _) = setup();
    register_and_login(&app, "ana@example.com").await;

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": "ana@example.com", "password": "wrong-one" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_order_is_rejected() {
    let (app, _) = setup();

    let response = app
        .oneshot(post_json(
            "/api/orders",
            serde_json::json!({ "event_id": uuid::Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_order_then_duplicate_conflicts() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;
    let (_, event_id) = seed_group_profile_event(&app, &token).await;

    let order_body = serde_json::json!({
        "event_id": event_id,
        "additional_options": { "sugar_quantity": 2, "milk_quantity": 1 },
    });

    let response = app
        .clone()
        .oneshot(authed(post_json("/api/orders", order_body.clone()), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = body_json(response).await;
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["additional_options"]["sugar_quantity"], 2);

    let response = app
        .oneshot(authed(post_json("/api/orders", order_body), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_order_unknown_event_not_found() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;
    seed_group_profile_event(&app, &token).await;

    let response = app
        .oneshot(authed(
            post_json(
                "/api/orders",
                serde_json::json!({ "event_id": uuid::Uuid::new_v4() }),
            ),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_my_orders_joins_events() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;
    let (_, event_id) = seed_group_profile_event(&app, &token).await;

    let response = app
        .clone()
        .oneshot(authed(
            post_json("/api/orders", serde_json::json!({ "event_id": event_id })),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(authed(
            Request::builder()
                .uri("/api/orders")
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let rows = body_json(response).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["event_id"], event_id);
    assert_eq!(rows[0]["event_type"], "COFFEE");
}

#[tokio::test]
async fn test_event_order_sheet_names_the_buyer() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;
    let (_, event_id) = seed_group_profile_event(&app, &token).await;

    app.clone()
        .oneshot(authed(
            post_json("/api/orders", serde_json::json!({ "event_id": event_id })),
            &token,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(authed(
            Request::builder()
                .uri(format!("/api/events/{event_id}/orders"))
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sheet = body_json(response).await;
    assert_eq!(sheet.as_array().unwrap().len(), 1);
    assert_eq!(sheet[0]["first_name"], "Ana");
    assert_eq!(sheet[0]["last_name"], "Horvat");
}

#[tokio::test]
async fn test_empty_listing_is_ok_with_empty_array() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;
    seed_group_profile_event(&app, &token).await;

    let response = app
        .oneshot(authed(
            Request::builder()
                .uri("/api/orders/activity?active=false")
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let rows = body_json(response).await;
    assert_eq!(rows, serde_json::json!([]));
}

#[tokio::test]
async fn test_manual_sweep_promotes_due_events() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/groups",
                serde_json::json!({ "name": "roastery", "description": "" }),
            ),
            &token,
        ))
        .await
        .unwrap();
    let group_id = body_json(response).await["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(authed(
            post_json(
                "/api/profiles",
                serde_json::json!({
                    "group_id": group_id,
                    "first_name": "Ana",
                    "last_name": "Horvat",
                }),
            ),
            &token,
        ))
        .await
        .unwrap();

    // An event already past its scheduled start.
    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/events",
                serde_json::json!({
                    "group_id": group_id,
                    "title": "overdue",
                    "description": "",
                    "pending_until": "2020-01-01T10:00:00Z",
                }),
            ),
            &token,
        ))
        .await
        .unwrap();
    let event_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .method("POST")
                .uri("/api/events/sweep")
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["promoted"], 1);
    assert_eq!(report["failed"], 0);

    let response = app
        .oneshot(authed(
            Request::builder()
                .uri(format!("/api/events/{event_id}"))
                .body(Body::empty())
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    let event = body_json(response).await;
    assert_eq!(event["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn test_rate_order_bumps_rating() {
    let (app, _) = setup();
    let token = register_and_login(&app, "ana@example.com").await;
    let (_, event_id) = seed_group_profile_event(&app, &token).await;

    let response = app
        .clone()
        .oneshot(authed(
            post_json("/api/orders", serde_json::json!({ "event_id": event_id })),
            &token,
        ))
        .await
        .unwrap();
    let order_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .method("PUT")
                .uri("/api/orders/rating")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(
                        &serde_json::json!({ "order_id": order_id, "rating": 9 }),
                    )
                    .unwrap(),
                ))
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(authed(
            Request::builder()
                .method("PUT")
                .uri("/api/orders/rating")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_string(
                        &serde_json::json!({ "order_id": order_id, "rating": 4 }),
                    )
                    .unwrap(),
                ))
                .unwrap(),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["rating"], 4);
}

#[tokio::test]
async fn test_brew_event_feed_excludes_own_sessions() {
    let (app, _) = setup();
    let ana = register_and_login(&app, "ana@example.com").await;
    let ivan = register_and_login(&app, "ivan@example.com").await;

    // Ivan starts a session; Ana should see it, Ivan should not.
    let response = app
        .clone()
        .oneshot(authed(
            post_json(
                "/api/brew-events",
                serde_json::json!({ "start_time": "2027-01-01T10:00:00Z" }),
            ),
            &ivan,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(authed(
            Request::builder()
                .uri("/api/brew-events/pending")
                .body(Body::empty())
                .unwrap(),
            &ana,
        ))
        .await
        .unwrap();
    let feed = body_json(response).await;
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["status"], "PENDING");

    let response = app
        .oneshot(authed(
            Request::builder()
                .uri("/api/brew-events/pending")
                .body(Body::empty())
                .unwrap(),
            &ivan,
        ))
        .await
        .unwrap();
    let feed = body_json(response).await;
    assert!(feed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
