//! Storage contracts shared by every backend.
//!
//! The lifecycle engine and the API only see these traits. Two backends
//! implement them: [`PostgresPool`](crate::PostgresPool) for deployments and
//! [`MemoryStore`](crate::MemoryStore) for development and tests.
//!
//! Each method is individually atomic at the storage layer. The one
//! compound operation, [`SnapshotRepository::insert_if_empty`], exists so the
//! lazy-seed read path can "create if none exists" without a check-then-act
//! race between concurrent first requests.

use std::future::Future;

use chrono::{DateTime, Utc};
use citywatch_types::{
    Alert, AlertId, AlertStatus, AlertUpdate, AnalyticsReport, CitizenRequest, CitySnapshot,
    Emergency,
};

use crate::error::DbError;

/// Result of [`SnapshotRepository::insert_if_empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum SeedOutcome {
    /// The store was empty and the candidate snapshot was written.
    Inserted(CitySnapshot),
    /// Another snapshot already existed; the latest one is returned and the
    /// candidate was discarded.
    Existing(CitySnapshot),
}

impl SeedOutcome {
    /// The snapshot callers should serve, whichever branch won.
    pub fn into_snapshot(self) -> CitySnapshot {
        match self {
            Self::Inserted(snapshot) | Self::Existing(snapshot) => snapshot,
        }
    }

    /// Whether this call wrote the seed.
    pub const fn was_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Persistence for city snapshots.
pub trait SnapshotRepository: Send + Sync {
    /// The snapshot with the greatest timestamp, if any exist.
    fn find_latest(&self) -> impl Future<Output = Result<Option<CitySnapshot>, DbError>> + Send;

    /// Every snapshot with `timestamp >= since`, oldest first.
    fn find_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<CitySnapshot>, DbError>> + Send;

    /// Write a new snapshot.
    fn insert(&self, snapshot: &CitySnapshot)
    -> impl Future<Output = Result<(), DbError>> + Send;

    /// Delete every snapshot with `timestamp < cutoff`, returning how many
    /// were removed.
    fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Atomically write `candidate` only if no snapshot exists at all.
    fn insert_if_empty(
        &self,
        candidate: &CitySnapshot,
    ) -> impl Future<Output = Result<SeedOutcome, DbError>> + Send;
}

/// Persistence for operator alerts.
pub trait AlertRepository: Send + Sync {
    /// Alerts in `status`, newest first, at most `limit`.
    fn list_alerts(
        &self,
        status: AlertStatus,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Alert>, DbError>> + Send;

    /// First alert whose message matches exactly.
    fn find_alert_by_message(
        &self,
        message: &str,
    ) -> impl Future<Output = Result<Option<Alert>, DbError>> + Send;

    /// Write a new alert.
    fn insert_alert(&self, alert: &Alert) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Apply a partial update. Returns `None` when the alert does not exist.
    fn update_alert(
        &self,
        id: AlertId,
        update: AlertUpdate,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<Alert>, DbError>> + Send;
}

/// Persistence for citizen service requests.
pub trait CitizenRequestRepository: Send + Sync {
    /// Requests newest first; restricted to one submitter when `citizen` is set.
    fn list_citizen_requests(
        &self,
        citizen: Option<&str>,
    ) -> impl Future<Output = Result<Vec<CitizenRequest>, DbError>> + Send;

    /// Write a new request.
    fn insert_citizen_request(
        &self,
        request: &CitizenRequest,
    ) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Persistence for emergency incidents.
pub trait EmergencyRepository: Send + Sync {
    /// Every emergency not yet resolved, newest first.
    fn list_open_emergencies(&self)
    -> impl Future<Output = Result<Vec<Emergency>, DbError>> + Send;

    /// Write a new emergency.
    fn insert_emergency(
        &self,
        emergency: &Emergency,
    ) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Persistence for daily analytics reports.
pub trait AnalyticsRepository: Send + Sync {
    /// Reports newest first; restricted to `date` in `[start, end]` when a
    /// range is given.
    fn list_analytics(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> impl Future<Output = Result<Vec<AnalyticsReport>, DbError>> + Send;

    /// Write a new report.
    fn insert_analytics(
        &self,
        report: &AnalyticsReport,
    ) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Liveness check for the health endpoint.
pub trait HealthCheck: Send + Sync {
    /// Short backend name shown on the health endpoint.
    fn backend(&self) -> &'static str;

    /// Confirm the backend answers.
    fn ping(&self) -> impl Future<Output = Result<(), DbError>> + Send;
}

/// Everything the server needs from a storage backend.
pub trait Store:
    SnapshotRepository
    + AlertRepository
    + CitizenRequestRepository
    + EmergencyRepository
    + AnalyticsRepository
    + HealthCheck
    + Clone
    + 'static
{
}

impl<T> Store for T where
    T: SnapshotRepository
        + AlertRepository
        + CitizenRequestRepository
        + EmergencyRepository
        + AnalyticsRepository
        + HealthCheck
        + Clone
        + 'static
{
}
