//! Citizen request and emergency endpoints.
//!
//! # Endpoints
//!
//! | Method | Path | Permission | Description |
//! |--------|------|-----------|-------------|
//! | `GET` | `/api/citizen-requests` | any key | Own requests; every request with `all` |
//! | `POST` | `/api/citizen-requests` | `citizen` | File a request owned by the caller |
//! | `GET` | `/api/emergencies` | `emergency` | Unresolved emergencies, newest first |
//! | `POST` | `/api/emergencies` | `emergency` | Report an emergency |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use citywatch_db::Store;
use citywatch_types::{
    CitizenRequest, CitizenRequestId, CitizenRequestPriority, CitizenRequestStatus,
    CitizenRequestType, Emergency, EmergencyId, EmergencySeverity, EmergencyStatus,
    EmergencyType, GeoPoint, Permission,
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Citizen requests
// ---------------------------------------------------------------------------

/// Request body for `POST /api/citizen-requests`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCitizenRequest {
    /// Kind of service requested.
    #[serde(rename = "type")]
    pub request_type: CitizenRequestType,
    /// What is wrong.
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    /// Where it is.
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    /// Urgency (default `Medium`).
    pub priority: Option<CitizenRequestPriority>,
}

/// List citizen requests visible to the caller, newest first.
pub async fn list_citizen_requests<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
) -> Result<Json<Vec<CitizenRequest>>, ApiError> {
    let owner = (!caller.0.is_unrestricted()).then(|| caller.name());
    let requests = state.store.list_citizen_requests(owner).await?;
    Ok(Json(requests))
}

/// File a citizen request owned by the caller.
pub async fn create_citizen_request<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    body: Result<ValidatedJson<CreateCitizenRequest>, ApiError>,
) -> Result<(StatusCode, Json<CitizenRequest>), ApiError> {
    caller.require(Permission::Citizen)?;
    let ValidatedJson(req) = body?;

    let now = Utc::now();
    let request = CitizenRequest {
        id: CitizenRequestId::new(),
        citizen: caller.name().to_owned(),
        request_type: req.request_type,
        description: req.description,
        location: req.location,
        priority: req.priority.unwrap_or_default(),
        status: CitizenRequestStatus::Open,
        assigned_to: None,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_citizen_request(&request).await?;

    tracing::info!(id = %request.id, citizen = %request.citizen, "Citizen request filed");
    Ok((StatusCode::CREATED, Json(request)))
}

// ---------------------------------------------------------------------------
// Emergencies
// ---------------------------------------------------------------------------

/// Request body for `POST /api/emergencies`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmergencyRequest {
    /// Incident type.
    #[serde(rename = "type")]
    pub emergency_type: EmergencyType,
    /// Severity.
    pub severity: EmergencySeverity,
    /// Free-text location.
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    /// Map position, when known.
    #[validate(custom(function = "valid_coordinates"))]
    pub coordinates: Option<GeoPoint>,
    /// What happened.
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    /// Whether an evacuation was ordered.
    #[serde(default)]
    pub evacuation_required: bool,
    /// Whether the public was alerted.
    #[serde(default)]
    pub public_alert: bool,
}

fn valid_coordinates(point: &GeoPoint) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng) {
        Ok(())
    } else {
        Err(ValidationError::new("coordinates_out_of_range"))
    }
}

/// List unresolved emergencies, newest first.
pub async fn list_emergencies<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
) -> Result<Json<Vec<Emergency>>, ApiError> {
    caller.require(Permission::Emergency)?;
    let emergencies = state.store.list_open_emergencies().await?;
    Ok(Json(emergencies))
}

/// Report an emergency on behalf of the caller.
pub async fn create_emergency<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    body: Result<ValidatedJson<CreateEmergencyRequest>, ApiError>,
) -> Result<(StatusCode, Json<Emergency>), ApiError> {
    caller.require(Permission::Emergency)?;
    let ValidatedJson(req) = body?;

    let now = Utc::now();
    let emergency = Emergency {
        id: EmergencyId::new(),
        emergency_type: req.emergency_type,
        severity: req.severity,
        location: req.location,
        coordinates: req.coordinates,
        description: req.description,
        status: EmergencyStatus::Active,
        evacuation_required: req.evacuation_required,
        public_alert: req.public_alert,
        reported_by: caller.name().to_owned(),
        created_at: now,
        updated_at: now,
    };
    state.store.insert_emergency(&emergency).await?;

    tracing::warn!(
        id = %emergency.id,
        kind = ?emergency.emergency_type,
        severity = ?emergency.severity,
        by = %emergency.reported_by,
        "Emergency reported"
    );
    Ok((StatusCode::CREATED, Json(emergency)))
}
