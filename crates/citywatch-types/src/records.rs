//! Operational records: alerts, citizen requests and emergencies.
//!
//! Unlike snapshots these records are created and edited through the API.
//! Each carries `created_at`/`updated_at` stamps set by the server, never by
//! the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AlertCategory, AlertKind, AlertPriority, AlertStatus, CitizenRequestPriority,
    CitizenRequestStatus, CitizenRequestType, EmergencySeverity, EmergencyStatus, EmergencyType,
};
use crate::ids::{AlertId, CitizenRequestId, EmergencyId};
use crate::snapshot::GeoPoint;

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Where an alert applies, for map markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AlertLocation {
    /// Human-readable place description.
    pub description: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// An operator-facing alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Alert {
    /// Unique identifier.
    pub id: AlertId,
    /// Severity class (serialized as `type`).
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// Subsystem the alert belongs to.
    pub category: AlertCategory,
    /// Human-readable message.
    pub message: String,
    /// Optional map position.
    pub location: Option<AlertLocation>,
    /// Triage priority.
    pub priority: AlertPriority,
    /// Workflow state.
    pub status: AlertStatus,
    /// Principal the alert is assigned to.
    pub assigned_to: Option<String>,
    /// Set when the alert moves to [`AlertStatus::Resolved`].
    pub resolved_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to an existing alert. Absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AlertUpdate {
    /// New severity class.
    #[serde(rename = "type")]
    pub kind: Option<AlertKind>,
    /// New category.
    pub category: Option<AlertCategory>,
    /// New message.
    pub message: Option<String>,
    /// New location.
    pub location: Option<AlertLocation>,
    /// New priority.
    pub priority: Option<AlertPriority>,
    /// New workflow state.
    pub status: Option<AlertStatus>,
    /// New assignee.
    pub assigned_to: Option<String>,
}

impl Alert {
    /// Apply a partial update, stamping `updated_at` and, on resolution,
    /// `resolved_at`.
    pub fn apply(&mut self, update: AlertUpdate, now: DateTime<Utc>) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if update.location.is_some() {
            self.location = update.location;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
            if status == AlertStatus::Resolved {
                self.resolved_at = Some(now);
            }
        }
        if update.assigned_to.is_some() {
            self.assigned_to = update.assigned_to;
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Citizen requests
// ---------------------------------------------------------------------------

/// A service request filed by a citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CitizenRequest {
    /// Unique identifier.
    pub id: CitizenRequestId,
    /// Principal name of the submitter.
    pub citizen: String,
    /// Kind of service requested (serialized as `type`).
    #[serde(rename = "type")]
    pub request_type: CitizenRequestType,
    /// Free-text description.
    pub description: String,
    /// Free-text location.
    pub location: String,
    /// Urgency.
    pub priority: CitizenRequestPriority,
    /// Workflow state.
    pub status: CitizenRequestStatus,
    /// Principal handling the request.
    pub assigned_to: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Emergencies
// ---------------------------------------------------------------------------

/// An emergency incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Emergency {
    /// Unique identifier.
    pub id: EmergencyId,
    /// Incident type (serialized as `type`).
    #[serde(rename = "type")]
    pub emergency_type: EmergencyType,
    /// Severity.
    pub severity: EmergencySeverity,
    /// Free-text location.
    pub location: String,
    /// Map position, when known.
    pub coordinates: Option<GeoPoint>,
    /// Free-text description.
    pub description: String,
    /// Response state.
    pub status: EmergencyStatus,
    /// Whether an evacuation was ordered.
    pub evacuation_required: bool,
    /// Whether the public was alerted.
    pub public_alert: bool,
    /// Principal that reported the incident.
    pub reported_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}
