//! Enumeration types for the CityWatch platform.
//!
//! Wire names follow what the dashboard already renders: metric labels are
//! lowercase, alert categories are capitalized, and citizen-facing values
//! (request types, emergency statuses) use human-readable phrases.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Metric labels
// ---------------------------------------------------------------------------

/// Qualitative air quality label attached to each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AirQualityStatus {
    /// Air quality is good.
    Good,
    /// Air quality is acceptable but not ideal.
    Moderate,
}

/// Direction the air quality index is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AirQualityTrend {
    /// Readings are getting better.
    Improving,
    /// Readings are flat.
    Stable,
}

/// Fill state of a waste collection area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum WasteStatus {
    /// Bins are within normal fill levels.
    Normal,
    /// Bins are close to capacity.
    Warning,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Severity class of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AlertKind {
    /// Immediate attention required.
    Critical,
    /// Something is off but not critical.
    Warning,
    /// Informational only.
    Info,
}

/// City subsystem an alert belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum AlertCategory {
    /// Road network and signals.
    Traffic,
    /// Power grid and generation.
    Energy,
    /// Air quality and environment.
    Environment,
    /// Water supply and treatment.
    Water,
    /// Waste collection.
    Waste,
    /// Surveillance and public safety.
    Security,
    /// Emergency response.
    Emergency,
}

/// Triage priority of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AlertPriority {
    /// Can wait.
    Low,
    /// Normal handling.
    #[default]
    Medium,
    /// Handle soon.
    High,
    /// Handle now.
    Critical,
}

/// Workflow state of an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AlertStatus {
    /// Raised and not yet handled.
    #[default]
    Active,
    /// Seen by an operator.
    Acknowledged,
    /// Closed out.
    Resolved,
}

impl AlertStatus {
    /// Wire label, also used as the indexed `status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }
}

// ---------------------------------------------------------------------------
// Citizen requests
// ---------------------------------------------------------------------------

/// Kind of service a citizen is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CitizenRequestType {
    /// Road surface damage.
    #[serde(rename = "Pothole Repair")]
    PotholeRepair,
    /// Broken or flickering street light.
    #[serde(rename = "Street Light Issue")]
    StreetLightIssue,
    /// Noise disturbance.
    #[serde(rename = "Noise Complaint")]
    NoiseComplaint,
    /// Park upkeep.
    #[serde(rename = "Park Maintenance")]
    ParkMaintenance,
    /// Faulty traffic signal.
    #[serde(rename = "Traffic Signal Problem")]
    TrafficSignalProblem,
    /// Missed or overflowing collection.
    #[serde(rename = "Waste Collection")]
    WasteCollection,
    /// Supply, pressure or quality problem.
    #[serde(rename = "Water Issue")]
    WaterIssue,
    /// Anything else.
    Other,
}

/// Urgency a citizen attaches to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CitizenRequestPriority {
    /// Low urgency.
    Low,
    /// Default urgency.
    #[default]
    Medium,
    /// High urgency.
    High,
    /// Needs emergency handling.
    Emergency,
}

/// Workflow state of a citizen request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CitizenRequestStatus {
    /// Submitted, not picked up.
    #[default]
    Open,
    /// Someone is working on it.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Work done.
    Resolved,
    /// Closed without further action.
    Closed,
}

// ---------------------------------------------------------------------------
// Emergencies
// ---------------------------------------------------------------------------

/// Type of emergency incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EmergencyType {
    /// Fire.
    Fire,
    /// Medical emergency.
    Medical,
    /// Police matter.
    Police,
    /// Flood, earthquake, storm.
    #[serde(rename = "Natural Disaster")]
    NaturalDisaster,
    /// Failure of city infrastructure.
    Infrastructure,
    /// Security threat.
    Security,
}

/// Severity of an emergency incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EmergencySeverity {
    /// Local and contained.
    Minor,
    /// Needs multiple units.
    Major,
    /// Threat to life.
    Critical,
    /// City-wide impact.
    Catastrophic,
}

/// Response state of an emergency incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EmergencyStatus {
    /// Reported, no response yet.
    #[default]
    Active,
    /// Units are on the way or on site.
    Responding,
    /// Contained but not closed.
    #[serde(rename = "Under Control")]
    UnderControl,
    /// Closed.
    Resolved,
}

impl EmergencyStatus {
    /// Wire label, also used as the indexed `status` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Responding => "Responding",
            Self::UnderControl => "Under Control",
            Self::Resolved => "Resolved",
        }
    }
}
