//! City metrics snapshot and its metric groups.
//!
//! A [`CitySnapshot`] is one complete reading of every tracked metric at a
//! single instant. Snapshots are produced by the generator, written once,
//! and later removed by the retention purge. Nothing edits a stored
//! snapshot, so the "current" reading is simply the one with the greatest
//! `timestamp`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AirQualityStatus, AirQualityTrend, WasteStatus};
use crate::ids::SnapshotId;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One point-in-time reading of the whole city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CitySnapshot {
    /// Storage identity.
    pub id: SnapshotId,
    /// When the snapshot was generated.
    pub timestamp: DateTime<Utc>,
    /// Reference point of the deployment (map center).
    pub location: GeoPoint,
    /// Road network metrics.
    pub traffic: TrafficMetrics,
    /// Grid metrics.
    pub energy: EnergyMetrics,
    /// Air quality metrics.
    pub air_quality: AirQualityMetrics,
    /// Water network metrics.
    pub water: WaterMetrics,
    /// Per-area waste collection state, in fixed area order.
    pub waste: Vec<WasteArea>,
    /// Street furniture and public service metrics.
    pub infrastructure: InfrastructureMetrics,
}

/// Road network metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TrafficMetrics {
    /// Congestion percentage.
    pub congestion: f64,
    /// Average speed in km/h.
    pub avg_speed: f64,
    /// Accidents reported in the current window.
    pub accidents: u32,
    /// Signals currently operating.
    pub active_signals: u32,
}

/// Grid metrics, all in megawatts except efficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EnergyMetrics {
    /// Total city consumption.
    pub total_consumption: f64,
    /// Renewable generation.
    pub renewable_generation: f64,
    /// Solar share of generation.
    pub solar_output: f64,
    /// Wind share of generation.
    pub wind_output: f64,
    /// Grid efficiency percentage.
    pub grid_efficiency: f64,
}

/// Air quality metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AirQualityMetrics {
    /// Air quality index.
    pub aqi: f64,
    /// PM2.5 concentration.
    pub pm25: f64,
    /// PM10 concentration.
    pub pm10: f64,
    /// Ozone concentration.
    pub ozone: f64,
    /// Qualitative label.
    pub status: AirQualityStatus,
    /// Direction of change.
    pub trend: AirQualityTrend,
}

/// Water network metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WaterMetrics {
    /// Quality percentage.
    pub quality: f64,
    /// Network pressure in psi.
    pub pressure: f64,
    /// Daily consumption in million litres.
    pub consumption: f64,
    /// Leaks currently detected.
    pub leaks: u32,
    /// Treatment plants in operation.
    pub treatment_plants: u32,
}

/// Waste collection state for one named area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WasteArea {
    /// Area name.
    pub area: String,
    /// Bin fill level percentage.
    pub level: f64,
    /// Fill state.
    pub status: WasteStatus,
    /// Last completed collection.
    pub last_collection: DateTime<Utc>,
    /// Next scheduled collection.
    pub next_collection: DateTime<Utc>,
    /// Map marker position.
    pub coordinates: GeoPoint,
}

/// Street furniture and public service metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct InfrastructureMetrics {
    /// Street lighting.
    pub street_lights: StreetLightMetrics,
    /// Public parking.
    pub parking: ParkingMetrics,
    /// Public Wi-Fi.
    pub wifi: WifiMetrics,
    /// CCTV network.
    pub cctv: CctvMetrics,
}

/// Street lighting metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StreetLightMetrics {
    /// Installed lights.
    pub total: u32,
    /// Lights currently on.
    pub active: u32,
    /// Energy saved percentage from dimming.
    pub energy_saved: f64,
}

/// Public parking metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ParkingMetrics {
    /// Total spaces.
    pub total: u32,
    /// Occupied spaces.
    pub occupied: u32,
    /// Revenue collected today.
    pub revenue: f64,
}

/// Public Wi-Fi metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WifiMetrics {
    /// Hotspots deployed.
    pub hotspots: u32,
    /// Connected users.
    pub active_users: u32,
    /// Uptime percentage.
    pub uptime: f64,
}

/// CCTV network metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CctvMetrics {
    /// Installed cameras.
    pub total: u32,
    /// Cameras online.
    pub active: u32,
    /// Incidents flagged.
    pub incidents: u32,
}
