//! In-process storage backend.
//!
//! [`MemoryStore`] keeps every table behind one async `RwLock`. Each trait
//! method takes the lock once, so the same per-call atomicity the
//! `PostgreSQL` backend gives holds here too. Nothing survives a restart.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use citywatch_types::{
    Alert, AlertId, AlertStatus, AlertUpdate, AnalyticsReport, CitizenRequest, CitySnapshot,
    Emergency, EmergencyStatus,
};
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::repository::{
    AlertRepository, AnalyticsRepository, CitizenRequestRepository, EmergencyRepository,
    HealthCheck, SeedOutcome, SnapshotRepository,
};

#[derive(Debug, Default)]
struct Tables {
    /// Sorted by `timestamp`, oldest first.
    snapshots: Vec<CitySnapshot>,
    alerts: Vec<Alert>,
    citizen_requests: Vec<CitizenRequest>,
    emergencies: Vec<Emergency>,
    analytics: Vec<AnalyticsReport>,
}

impl Tables {
    fn insert_snapshot(&mut self, snapshot: CitySnapshot) {
        let at = self
            .snapshots
            .partition_point(|s| s.timestamp <= snapshot.timestamp);
        self.snapshots.insert(at, snapshot);
    }
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub async fn snapshot_count(&self) -> usize {
        self.tables.read().await.snapshots.len()
    }
}

impl SnapshotRepository for MemoryStore {
    async fn find_latest(&self) -> Result<Option<CitySnapshot>, DbError> {
        Ok(self.tables.read().await.snapshots.last().cloned())
    }

    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<CitySnapshot>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .snapshots
            .iter()
            .filter(|s| s.timestamp >= since)
            .cloned()
            .collect())
    }

    async fn insert(&self, snapshot: &CitySnapshot) -> Result<(), DbError> {
        self.tables.write().await.insert_snapshot(snapshot.clone());
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let mut tables = self.tables.write().await;
        let before = tables.snapshots.len();
        tables.snapshots.retain(|s| s.timestamp >= cutoff);
        let purged = before.saturating_sub(tables.snapshots.len());
        Ok(u64::try_from(purged).unwrap_or(u64::MAX))
    }

    async fn insert_if_empty(&self, candidate: &CitySnapshot) -> Result<SeedOutcome, DbError> {
        let mut tables = self.tables.write().await;
        if let Some(latest) = tables.snapshots.last() {
            return Ok(SeedOutcome::Existing(latest.clone()));
        }
        tables.insert_snapshot(candidate.clone());
        tracing::info!(id = %candidate.id, "Seeded initial city snapshot");
        Ok(SeedOutcome::Inserted(candidate.clone()))
    }
}

impl AlertRepository for MemoryStore {
    async fn list_alerts(&self, status: AlertStatus, limit: usize) -> Result<Vec<Alert>, DbError> {
        let tables = self.tables.read().await;
        let mut alerts: Vec<Alert> = tables
            .alerts
            .iter()
            .filter(|a| a.status == status)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        alerts.truncate(limit);
        Ok(alerts)
    }

    async fn find_alert_by_message(&self, message: &str) -> Result<Option<Alert>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.alerts.iter().find(|a| a.message == message).cloned())
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), DbError> {
        self.tables.write().await.alerts.push(alert.clone());
        Ok(())
    }

    async fn update_alert(
        &self,
        id: AlertId,
        update: AlertUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Alert>, DbError> {
        let mut tables = self.tables.write().await;
        let Some(alert) = tables.alerts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        alert.apply(update, now);
        Ok(Some(alert.clone()))
    }
}

impl CitizenRequestRepository for MemoryStore {
    async fn list_citizen_requests(
        &self,
        citizen: Option<&str>,
    ) -> Result<Vec<CitizenRequest>, DbError> {
        let tables = self.tables.read().await;
        let mut requests: Vec<CitizenRequest> = tables
            .citizen_requests
            .iter()
            .filter(|r| citizen.is_none_or(|name| r.citizen == name))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn insert_citizen_request(&self, request: &CitizenRequest) -> Result<(), DbError> {
        self.tables
            .write()
            .await
            .citizen_requests
            .push(request.clone());
        Ok(())
    }
}

impl EmergencyRepository for MemoryStore {
    async fn list_open_emergencies(&self) -> Result<Vec<Emergency>, DbError> {
        let tables = self.tables.read().await;
        let mut open: Vec<Emergency> = tables
            .emergencies
            .iter()
            .filter(|e| e.status != EmergencyStatus::Resolved)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(open)
    }

    async fn insert_emergency(&self, emergency: &Emergency) -> Result<(), DbError> {
        self.tables.write().await.emergencies.push(emergency.clone());
        Ok(())
    }
}

impl AnalyticsRepository for MemoryStore {
    async fn list_analytics(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AnalyticsReport>, DbError> {
        let tables = self.tables.read().await;
        let mut reports: Vec<AnalyticsReport> = tables
            .analytics
            .iter()
            .filter(|r| range.is_none_or(|(start, end)| r.within(start, end)))
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(reports)
    }

    async fn insert_analytics(&self, report: &AnalyticsReport) -> Result<(), DbError> {
        self.tables.write().await.analytics.push(report.clone());
        Ok(())
    }
}

impl HealthCheck for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use citywatch_types::{
        AirQualityMetrics, AirQualityStatus, AirQualityTrend, AlertCategory, AlertKind,
        AlertPriority, AnalyticsId, AnalyticsMetrics, CctvMetrics, EnergyMetrics, GeoPoint,
        InfrastructureMetrics, ParkingMetrics, SnapshotId, StreetLightMetrics, TrafficMetrics,
        WaterMetrics, WifiMetrics,
    };

    use super::*;

    fn snapshot_at(timestamp: DateTime<Utc>) -> CitySnapshot {
        CitySnapshot {
            id: SnapshotId::new(),
            timestamp,
            location: GeoPoint::new(19.0760, 72.8777),
            traffic: TrafficMetrics {
                congestion: 50.0,
                avg_speed: 50.0,
                accidents: 2,
                active_signals: 160,
            },
            energy: EnergyMetrics {
                total_consumption: 500.0,
                renewable_generation: 200.0,
                solar_output: 80.0,
                wind_output: 120.0,
                grid_efficiency: 90.0,
            },
            air_quality: AirQualityMetrics {
                aqi: 75.0,
                pm25: 35.0,
                pm10: 50.0,
                ozone: 95.0,
                status: AirQualityStatus::Moderate,
                trend: AirQualityTrend::Stable,
            },
            water: WaterMetrics {
                quality: 94.0,
                pressure: 80.0,
                consumption: 2.5,
                leaks: 1,
                treatment_plants: 3,
            },
            waste: Vec::new(),
            infrastructure: InfrastructureMetrics {
                street_lights: StreetLightMetrics {
                    total: 3000,
                    active: 2940,
                    energy_saved: 25.0,
                },
                parking: ParkingMetrics {
                    total: 1800,
                    occupied: 1200,
                    revenue: 16000.0,
                },
                wifi: WifiMetrics {
                    hotspots: 156,
                    active_users: 9000,
                    uptime: 99.0,
                },
                cctv: CctvMetrics {
                    total: 245,
                    active: 242,
                    incidents: 4,
                },
            },
        }
    }

    fn alert(message: &str, created_at: DateTime<Utc>) -> Alert {
        Alert {
            id: AlertId::new(),
            kind: AlertKind::Info,
            category: AlertCategory::Energy,
            message: message.to_owned(),
            location: None,
            priority: AlertPriority::Low,
            status: AlertStatus::Active,
            assigned_to: None,
            resolved_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn latest_is_greatest_timestamp_not_last_inserted() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let newer = snapshot_at(now);
        let older = snapshot_at(now - Duration::hours(1));

        store.insert(&newer).await.unwrap();
        store.insert(&older).await.unwrap();

        let latest = store.find_latest().await.unwrap();
        assert_eq!(latest.map(|s| s.id), Some(newer.id));
    }

    #[tokio::test]
    async fn find_since_is_inclusive_and_ascending() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for hours in [3, 1, 2] {
            store
                .insert(&snapshot_at(now - Duration::hours(hours)))
                .await
                .unwrap();
        }

        let since = now - Duration::hours(2);
        let found = store.find_since(since).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found.first().map(|s| s.timestamp), Some(since));
        assert!(found.windows(2).all(|w| match w {
            [a, b] => a.timestamp <= b.timestamp,
            _ => true,
        }));
    }

    #[tokio::test]
    async fn delete_older_than_keeps_cutoff_boundary() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let cutoff = now - Duration::hours(24);
        store.insert(&snapshot_at(cutoff)).await.unwrap();
        store
            .insert(&snapshot_at(cutoff - Duration::seconds(1)))
            .await
            .unwrap();

        let purged = store.delete_older_than(cutoff).await.unwrap();
        assert_eq!(purged, 1);
        assert_eq!(store.snapshot_count().await, 1);
    }

    #[tokio::test]
    async fn insert_if_empty_only_seeds_once() {
        let store = MemoryStore::new();
        let first = snapshot_at(Utc::now());
        let second = snapshot_at(Utc::now());

        let a = store.insert_if_empty(&first).await;
        let b = store.insert_if_empty(&second).await;

        assert!(matches!(a, Ok(SeedOutcome::Inserted(_))));
        assert!(matches!(b, Ok(SeedOutcome::Existing(ref e)) if e.id == first.id));
        assert_eq!(store.snapshot_count().await, 1);
    }

    #[tokio::test]
    async fn list_alerts_filters_orders_and_limits() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .insert_alert(&alert("old", now - Duration::minutes(10)))
            .await
            .unwrap();
        store.insert_alert(&alert("new", now)).await.unwrap();
        let mut done = alert("done", now);
        done.status = AlertStatus::Resolved;
        store.insert_alert(&done).await.unwrap();

        let active = store.list_alerts(AlertStatus::Active, 1).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().map(|a| a.message.as_str()), Some("new"));
    }

    #[tokio::test]
    async fn update_unknown_alert_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_alert(AlertId::new(), AlertUpdate::default(), Utc::now())
            .await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn clones_share_tables() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.insert(&snapshot_at(Utc::now())).await.unwrap();
        assert_eq!(store.snapshot_count().await, 1);
    }

    #[tokio::test]
    async fn analytics_range_filter_newest_first() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for days in [0, 2, 5] {
            let report = AnalyticsReport {
                id: AnalyticsId::new(),
                date: now - Duration::days(days),
                metrics: AnalyticsMetrics::default(),
                predictions: Vec::new(),
                recommendations: Vec::new(),
            };
            store.insert_analytics(&report).await.unwrap();
        }

        let all = store.list_analytics(None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all.first().map(|r| r.date), Some(now));

        let range = Some((now - Duration::days(3), now - Duration::days(1)));
        let window = store.list_analytics(range).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window.first().map(|r| r.date), Some(now - Duration::days(2)));
    }
}
