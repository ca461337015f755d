//! Daily analytics reports for the administrator dashboard.
//!
//! A report summarizes one day of platform activity and carries model
//! output (predictions and recommendations) as free text. Reports are read
//! by date range; nothing in the request path computes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::AnalyticsId;

/// Aggregate counters and efficiency scores for one day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AnalyticsMetrics {
    /// Registered principals.
    pub total_users: u64,
    /// Platform uptime in percent.
    pub system_uptime: f64,
    /// Alerts raised during the day.
    pub alerts_generated: u64,
    /// Alerts resolved during the day.
    pub alerts_resolved: u64,
    /// Citizen requests filed during the day.
    pub citizen_requests: u64,
    /// Emergencies reported during the day.
    pub emergency_incidents: u64,
    /// Grid efficiency score.
    pub energy_efficiency: f64,
    /// Traffic flow optimization score.
    pub traffic_flow_optimization: f64,
    /// Air quality improvement score.
    pub air_quality_improvement: f64,
    /// Waste collection efficiency score.
    pub waste_collection_efficiency: f64,
}

/// A forecast attached to a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Prediction {
    /// Subsystem the forecast concerns.
    pub category: String,
    /// Forecast text.
    pub prediction: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Horizon, e.g. `next 24 hours`.
    pub timeframe: String,
}

/// A suggested action attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Recommendation {
    /// Subsystem the action concerns.
    pub category: String,
    /// Suggested action.
    pub recommendation: String,
    /// Free-text priority.
    pub priority: String,
    /// Expected effect.
    pub estimated_impact: String,
}

/// One analytics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AnalyticsReport {
    /// Unique identifier.
    pub id: AnalyticsId,
    /// Day the report covers.
    pub date: DateTime<Utc>,
    /// Aggregate metrics.
    pub metrics: AnalyticsMetrics,
    /// Forecasts.
    #[serde(default)]
    pub predictions: Vec<Prediction>,
    /// Suggested actions.
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl AnalyticsReport {
    /// Whether the report date lies in `[start, end]`.
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start <= self.date && self.date <= end
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn report_on(day: u32) -> AnalyticsReport {
        AnalyticsReport {
            id: AnalyticsId::new(),
            date: Utc.with_ymd_and_hms(2025, 3, day, 0, 0, 0).single().unwrap_or_default(),
            metrics: AnalyticsMetrics::default(),
            predictions: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let start = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).single().unwrap_or_default();
        let end = Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).single().unwrap_or_default();
        assert!(!report_on(1).within(start, end));
        assert!(report_on(2).within(start, end));
        assert!(report_on(4).within(start, end));
        assert!(!report_on(5).within(start, end));
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(report_on(1)).unwrap_or_default();
        assert!(json["metrics"].get("alertsGenerated").is_some());
        assert!(json["metrics"].get("wasteCollectionEfficiency").is_some());
    }
}
