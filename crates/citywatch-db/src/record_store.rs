//! Alert, citizen request, emergency and analytics persistence on
//! `PostgreSQL`.
//!
//! Records are stored as JSONB documents. The columns next to `payload`
//! exist only for filtering and ordering and are rewritten whenever the
//! document changes.

use chrono::{DateTime, Utc};
use citywatch_types::{
    Alert, AlertId, AlertStatus, AlertUpdate, AnalyticsReport, CitizenRequest, Emergency,
    EmergencyStatus,
};
use serde::de::DeserializeOwned;

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::repository::{
    AlertRepository, AnalyticsRepository, CitizenRequestRepository, EmergencyRepository,
    HealthCheck,
};

/// A JSONB document column.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    /// Full record document.
    pub payload: serde_json::Value,
}

/// Decode a list of document rows into records.
fn decode_all<T: DeserializeOwned>(rows: Vec<DocumentRow>) -> Result<Vec<T>, DbError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row.payload).map_err(DbError::from))
        .collect()
}

// =========================================================================
// Alerts
// =========================================================================

impl AlertRepository for PostgresPool {
    async fn list_alerts(&self, status: AlertStatus, limit: usize) -> Result<Vec<Alert>, DbError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, DocumentRow>(
            r"SELECT payload
              FROM alerts
              WHERE status = $1
              ORDER BY created_at DESC
              LIMIT $2",
        )
        .bind(status.as_str())
        .bind(limit_i64)
        .fetch_all(self.pool())
        .await?;

        decode_all(rows)
    }

    async fn find_alert_by_message(&self, message: &str) -> Result<Option<Alert>, DbError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"SELECT payload FROM alerts WHERE message = $1 LIMIT 1",
        )
        .bind(message)
        .fetch_optional(self.pool())
        .await?;

        row.map(|r| serde_json::from_value(r.payload).map_err(DbError::from))
            .transpose()
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<(), DbError> {
        let payload = serde_json::to_value(alert)?;

        sqlx::query(
            r"INSERT INTO alerts (id, status, message, created_at, payload)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(alert.id.into_inner())
        .bind(alert.status.as_str())
        .bind(&alert.message)
        .bind(alert.created_at)
        .bind(&payload)
        .execute(self.pool())
        .await?;

        tracing::debug!(id = %alert.id, category = ?alert.category, "Inserted alert");
        Ok(())
    }

    async fn update_alert(
        &self,
        id: AlertId,
        update: AlertUpdate,
        now: DateTime<Utc>,
    ) -> Result<Option<Alert>, DbError> {
        let mut tx = self.pool().begin().await?;

        let row = sqlx::query_as::<_, DocumentRow>(
            r"SELECT payload FROM alerts WHERE id = $1 FOR UPDATE",
        )
        .bind(id.into_inner())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut alert: Alert = serde_json::from_value(row.payload)?;
        alert.apply(update, now);
        let payload = serde_json::to_value(&alert)?;

        sqlx::query(
            r"UPDATE alerts
              SET status = $2, message = $3, payload = $4
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(alert.status.as_str())
        .bind(&alert.message)
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(%id, status = alert.status.as_str(), "Updated alert");
        Ok(Some(alert))
    }
}

// =========================================================================
// Citizen requests
// =========================================================================

impl CitizenRequestRepository for PostgresPool {
    async fn list_citizen_requests(
        &self,
        citizen: Option<&str>,
    ) -> Result<Vec<CitizenRequest>, DbError> {
        let rows = match citizen {
            Some(name) => {
                sqlx::query_as::<_, DocumentRow>(
                    r"SELECT payload
                      FROM citizen_requests
                      WHERE citizen = $1
                      ORDER BY created_at DESC",
                )
                .bind(name)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, DocumentRow>(
                    r"SELECT payload
                      FROM citizen_requests
                      ORDER BY created_at DESC",
                )
                .fetch_all(self.pool())
                .await?
            }
        };

        decode_all(rows)
    }

    async fn insert_citizen_request(&self, request: &CitizenRequest) -> Result<(), DbError> {
        let payload = serde_json::to_value(request)?;

        sqlx::query(
            r"INSERT INTO citizen_requests (id, citizen, created_at, payload)
              VALUES ($1, $2, $3, $4)",
        )
        .bind(request.id.into_inner())
        .bind(&request.citizen)
        .bind(request.created_at)
        .bind(&payload)
        .execute(self.pool())
        .await?;

        tracing::debug!(id = %request.id, citizen = %request.citizen, "Inserted citizen request");
        Ok(())
    }
}

// =========================================================================
// Emergencies
// =========================================================================

impl EmergencyRepository for PostgresPool {
    async fn list_open_emergencies(&self) -> Result<Vec<Emergency>, DbError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"SELECT payload
              FROM emergencies
              WHERE status <> $1
              ORDER BY created_at DESC",
        )
        .bind(EmergencyStatus::Resolved.as_str())
        .fetch_all(self.pool())
        .await?;

        decode_all(rows)
    }

    async fn insert_emergency(&self, emergency: &Emergency) -> Result<(), DbError> {
        let payload = serde_json::to_value(emergency)?;

        sqlx::query(
            r"INSERT INTO emergencies (id, status, created_at, payload)
              VALUES ($1, $2, $3, $4)",
        )
        .bind(emergency.id.into_inner())
        .bind(emergency.status.as_str())
        .bind(emergency.created_at)
        .bind(&payload)
        .execute(self.pool())
        .await?;

        tracing::debug!(id = %emergency.id, severity = ?emergency.severity, "Inserted emergency");
        Ok(())
    }
}

// =========================================================================
// Analytics
// =========================================================================

impl AnalyticsRepository for PostgresPool {
    async fn list_analytics(
        &self,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<AnalyticsReport>, DbError> {
        let rows = match range {
            Some((start, end)) => {
                sqlx::query_as::<_, DocumentRow>(
                    r"SELECT payload
                      FROM analytics
                      WHERE report_date BETWEEN $1 AND $2
                      ORDER BY report_date DESC",
                )
                .bind(start)
                .bind(end)
                .fetch_all(self.pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, DocumentRow>(
                    r"SELECT payload FROM analytics ORDER BY report_date DESC",
                )
                .fetch_all(self.pool())
                .await?
            }
        };

        decode_all(rows)
    }

    async fn insert_analytics(&self, report: &AnalyticsReport) -> Result<(), DbError> {
        let payload = serde_json::to_value(report)?;

        sqlx::query(
            r"INSERT INTO analytics (id, report_date, payload)
              VALUES ($1, $2, $3)",
        )
        .bind(report.id.into_inner())
        .bind(report.date)
        .bind(&payload)
        .execute(self.pool())
        .await?;

        tracing::debug!(id = %report.id, date = %report.date, "Inserted analytics report");
        Ok(())
    }
}

impl HealthCheck for PostgresPool {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DbError> {
        Self::ping(self).await
    }
}
