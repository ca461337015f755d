//! Alert endpoints.
//!
//! # Endpoints
//!
//! | Method | Path | Permission | Description |
//! |--------|------|-----------|-------------|
//! | `GET` | `/api/alerts` | `view` | Alerts in one status, newest first |
//! | `POST` | `/api/alerts` | `alerts` | Raise an alert |
//! | `PUT` | `/api/alerts/{id}` | `alerts` | Partial update; resolving stamps `resolvedAt` |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use citywatch_db::Store;
use citywatch_types::{
    Alert, AlertCategory, AlertId, AlertKind, AlertLocation, AlertPriority, AlertStatus,
    AlertUpdate, Permission,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::Caller;
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

/// Default page size for `GET /api/alerts`.
const DEFAULT_ALERT_LIMIT: usize = 50;

/// Largest page size for `GET /api/alerts`.
const MAX_ALERT_LIMIT: usize = 500;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/alerts`.
#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    /// Status to list (default `active`).
    pub status: Option<AlertStatus>,
    /// Maximum alerts to return (default 50, capped at 500).
    pub limit: Option<usize>,
}

/// Request body for `POST /api/alerts`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    /// Severity class.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Subsystem.
    pub category: AlertCategory,
    /// Human-readable message.
    #[validate(length(min = 1, max = 500))]
    pub message: String,
    /// Optional map position.
    #[validate(custom(function = "valid_location"))]
    pub location: Option<AlertLocation>,
    /// Triage priority (default `medium`).
    pub priority: Option<AlertPriority>,
    /// Assignee.
    #[validate(length(min = 1, max = 100))]
    pub assigned_to: Option<String>,
}

/// Request body for `PUT /api/alerts/{id}`. Absent fields are kept.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    /// New severity class.
    #[serde(rename = "type")]
    pub kind: Option<AlertKind>,
    /// New category.
    pub category: Option<AlertCategory>,
    /// New message.
    #[validate(length(min = 1, max = 500))]
    pub message: Option<String>,
    /// New location.
    #[validate(custom(function = "valid_location"))]
    pub location: Option<AlertLocation>,
    /// New priority.
    pub priority: Option<AlertPriority>,
    /// New status.
    pub status: Option<AlertStatus>,
    /// New assignee.
    #[validate(length(min = 1, max = 100))]
    pub assigned_to: Option<String>,
}

impl From<UpdateAlertRequest> for AlertUpdate {
    fn from(req: UpdateAlertRequest) -> Self {
        Self {
            kind: req.kind,
            category: req.category,
            message: req.message,
            location: req.location,
            priority: req.priority,
            status: req.status,
            assigned_to: req.assigned_to,
        }
    }
}

fn valid_location(location: &AlertLocation) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&location.lat) && (-180.0..=180.0).contains(&location.lng) {
        Ok(())
    } else {
        Err(ValidationError::new("coordinates_out_of_range"))
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// List alerts in one status, newest first.
pub async fn list_alerts<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    query: Result<Query<AlertsQuery>, QueryRejection>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    caller.require(Permission::View)?;
    let Query(query) = query.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let status = query.status.unwrap_or_default();
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ALERT_LIMIT)
        .clamp(1, MAX_ALERT_LIMIT);

    let alerts = state.store.list_alerts(status, limit).await?;
    Ok(Json(alerts))
}

/// Raise a new alert.
pub async fn create_alert<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    body: Result<ValidatedJson<CreateAlertRequest>, ApiError>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    caller.require(Permission::Alerts)?;
    let ValidatedJson(req) = body?;

    let now = Utc::now();
    let alert = Alert {
        id: AlertId::new(),
        kind: req.kind,
        category: req.category,
        message: req.message,
        location: req.location,
        priority: req.priority.unwrap_or_default(),
        status: AlertStatus::Active,
        assigned_to: req.assigned_to,
        resolved_at: None,
        created_at: now,
        updated_at: now,
    };
    state.store.insert_alert(&alert).await?;

    tracing::info!(
        id = %alert.id,
        category = ?alert.category,
        by = caller.name(),
        "Alert raised"
    );
    Ok((StatusCode::CREATED, Json(alert)))
}

/// Apply a partial update to an alert.
pub async fn update_alert<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<ValidatedJson<UpdateAlertRequest>, ApiError>,
) -> Result<Json<Alert>, ApiError> {
    caller.require(Permission::Alerts)?;
    let Path(id) = id.map_err(|_| ApiError::InvalidInput(String::from("Invalid alert id")))?;
    let ValidatedJson(req) = body?;
    let id = AlertId::from(id);

    let updated = state
        .store
        .update_alert(id, req.into(), Utc::now())
        .await?
        .ok_or_else(|| ApiError::NotFound(String::from("Alert not found")))?;

    tracing::info!(%id, status = updated.status.as_str(), by = caller.name(), "Alert updated");
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_maps_every_field() {
        let req = UpdateAlertRequest {
            status: Some(AlertStatus::Resolved),
            message: Some(String::from("cleared")),
            ..UpdateAlertRequest::default()
        };
        let update = AlertUpdate::from(req);
        assert_eq!(update.status, Some(AlertStatus::Resolved));
        assert_eq!(update.message.as_deref(), Some("cleared"));
        assert!(update.kind.is_none());
    }

    #[test]
    fn create_request_rejects_empty_message() {
        let req: Result<CreateAlertRequest, _> = serde_json::from_value(serde_json::json!({
            "type": "warning",
            "category": "Water",
            "message": "",
        }));
        let req = req.ok();
        assert!(req.is_some_and(|r| r.validate().is_err()));
    }

    #[test]
    fn location_must_be_on_the_globe() {
        let bad = AlertLocation {
            description: String::from("nowhere"),
            lat: 91.0,
            lng: 0.0,
        };
        assert!(valid_location(&bad).is_err());
    }
}
