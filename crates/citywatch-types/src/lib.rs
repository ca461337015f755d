//! Shared type definitions for the CityWatch monitoring platform.
//!
//! This crate is the single source of truth for every record that crosses a
//! crate or process boundary. Types flow to `TypeScript` via `ts-rs` for the
//! dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for stored records
//! - [`enums`] -- Metric labels and record workflow states
//! - [`snapshot`] -- The city metrics snapshot and its metric groups
//! - [`records`] -- Alerts, citizen requests and emergencies
//! - [`access`] -- Roles, permissions and the authenticated principal
//! - [`analytics`] -- Daily analytics reports

pub mod access;
pub mod analytics;
pub mod enums;
pub mod ids;
pub mod records;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use access::{Permission, Principal, Role};
pub use analytics::{AnalyticsMetrics, AnalyticsReport, Prediction, Recommendation};
pub use enums::{
    AirQualityStatus, AirQualityTrend, AlertCategory, AlertKind, AlertPriority, AlertStatus,
    CitizenRequestPriority, CitizenRequestStatus, CitizenRequestType, EmergencySeverity,
    EmergencyStatus, EmergencyType, WasteStatus,
};
pub use ids::{AlertId, AnalyticsId, CitizenRequestId, EmergencyId, SnapshotId};
pub use records::{Alert, AlertLocation, AlertUpdate, CitizenRequest, Emergency};
pub use snapshot::{
    AirQualityMetrics, CctvMetrics, CitySnapshot, EnergyMetrics, GeoPoint, InfrastructureMetrics,
    ParkingMetrics, StreetLightMetrics, TrafficMetrics, WasteArea, WaterMetrics, WifiMetrics,
};
