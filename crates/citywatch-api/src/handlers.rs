//! Health and city data endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Permission | Description |
//! |--------|------|-----------|-------------|
//! | `GET` | `/api/health` | none | Liveness and storage status |
//! | `GET` | `/api/city-data` | `view` | Latest snapshot (seeded on first read) |
//! | `GET` | `/api/city-data/history` | `view` | Snapshots from the last `hours` hours |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use citywatch_db::Store;
use citywatch_types::{CitySnapshot, Permission};
use serde::{Deserialize, Serialize};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Default history window in hours.
const DEFAULT_HISTORY_HOURS: u32 = 24;

/// Largest history window in hours (30 days).
const MAX_HISTORY_HOURS: u32 = 720;

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Response body for `GET /api/health`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `OK` when the process answers.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
    /// Seconds since the API state was created.
    pub uptime: f64,
    /// Crate version.
    pub version: String,
    /// Storage backend label.
    pub storage: String,
    /// `Connected` if the backend answered a ping.
    pub database: String,
}

/// Report liveness and whether the storage backend answers.
pub async fn health<S: Store>(State(state): State<Arc<AppState<S>>>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => "Connected",
        Err(e) => {
            tracing::warn!(error = %e, "Health check ping failed");
            "Disconnected"
        }
    };

    Json(HealthResponse {
        status: String::from("OK"),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        version: String::from(env!("CARGO_PKG_VERSION")),
        storage: String::from(state.store.backend()),
        database: String::from(database),
    })
}

// ---------------------------------------------------------------------------
// GET /api/city-data
// ---------------------------------------------------------------------------

/// Return the latest snapshot, seeding one if none exists.
pub async fn city_data<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
) -> Result<Json<CitySnapshot>, ApiError> {
    caller.require(Permission::View)?;
    let snapshot = state.reader.latest().await?;
    Ok(Json(snapshot))
}

// ---------------------------------------------------------------------------
// GET /api/city-data/history
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/city-data/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Window length in hours (default 24, at most 720).
    pub hours: Option<u32>,
}

/// Return every snapshot in the requested window, oldest first.
pub async fn city_data_history<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<CitySnapshot>>, ApiError> {
    caller.require(Permission::View)?;
    let Query(query) = query.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let hours = query.hours.unwrap_or(DEFAULT_HISTORY_HOURS);
    if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
        return Err(ApiError::InvalidInput(format!(
            "hours must be between 1 and {MAX_HISTORY_HOURS}"
        )));
    }

    let snapshots = state.reader.history(hours).await?;
    Ok(Json(snapshots))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// 404 for any route not matched above.
pub async fn not_found() -> ApiError {
    ApiError::NotFound(String::from("Route not found"))
}
