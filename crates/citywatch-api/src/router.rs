//! Axum router construction for the city API.
//!
//! Assembles all routes into a single [`Router`] with CORS restricted to
//! the configured dashboard origins.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, put};
use citywatch_db::Store;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{alerts, analytics, handlers, incidents};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /api/health` -- liveness and storage status
/// - `GET /api/city-data` -- latest snapshot
/// - `GET /api/city-data/history` -- snapshots in a time window
/// - `GET|POST /api/alerts` -- list and raise alerts
/// - `PUT /api/alerts/{id}` -- update an alert
/// - `GET|POST /api/citizen-requests` -- list and file citizen requests
/// - `GET|POST /api/emergencies` -- list and report emergencies
/// - `GET /api/analytics` -- analytics reports (admin only)
///
/// Anything else answers 404 in the standard error shape.
pub fn build_router<S: Store>(state: Arc<AppState<S>>) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/api/health", get(handlers::health::<S>))
        .route("/api/city-data", get(handlers::city_data::<S>))
        .route(
            "/api/city-data/history",
            get(handlers::city_data_history::<S>),
        )
        .route(
            "/api/alerts",
            get(alerts::list_alerts::<S>).post(alerts::create_alert::<S>),
        )
        .route("/api/alerts/{id}", put(alerts::update_alert::<S>))
        .route(
            "/api/citizen-requests",
            get(incidents::list_citizen_requests::<S>)
                .post(incidents::create_citizen_request::<S>),
        )
        .route(
            "/api/emergencies",
            get(incidents::list_emergencies::<S>).post(incidents::create_emergency::<S>),
        )
        .route("/api/analytics", get(analytics::list_analytics::<S>))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
