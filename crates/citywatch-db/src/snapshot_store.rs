//! Snapshot persistence on `PostgreSQL`.
//!
//! Each snapshot is one row in `city_snapshots`: the full document in
//! `payload`, with `taken_at` lifted out so the latest, range and purge
//! queries run off an index.

use chrono::{DateTime, Utc};
use citywatch_types::CitySnapshot;
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::repository::{SeedOutcome, SnapshotRepository};

/// Advisory lock key serializing the lazy-seed existence check and insert
/// across every connection and every server process.
const SEED_LOCK_KEY: i64 = 0x6369_7479_7761_7463;

impl SnapshotRepository for PostgresPool {
    async fn find_latest(&self) -> Result<Option<CitySnapshot>, DbError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r"SELECT id, taken_at, payload
              FROM city_snapshots
              ORDER BY taken_at DESC
              LIMIT 1",
        )
        .fetch_optional(self.pool())
        .await?;

        row.map(SnapshotRow::into_snapshot).transpose()
    }

    async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<CitySnapshot>, DbError> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            r"SELECT id, taken_at, payload
              FROM city_snapshots
              WHERE taken_at >= $1
              ORDER BY taken_at ASC",
        )
        .bind(since)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(SnapshotRow::into_snapshot).collect()
    }

    async fn insert(&self, snapshot: &CitySnapshot) -> Result<(), DbError> {
        let payload = serde_json::to_value(snapshot)?;

        sqlx::query(
            r"INSERT INTO city_snapshots (id, taken_at, payload)
              VALUES ($1, $2, $3)",
        )
        .bind(snapshot.id.into_inner())
        .bind(snapshot.timestamp)
        .bind(&payload)
        .execute(self.pool())
        .await?;

        tracing::debug!(id = %snapshot.id, timestamp = %snapshot.timestamp, "Inserted city snapshot");
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
        let result = sqlx::query(r"DELETE FROM city_snapshots WHERE taken_at < $1")
            .bind(cutoff)
            .execute(self.pool())
            .await?;

        let purged = result.rows_affected();
        tracing::debug!(%cutoff, purged, "Purged expired city snapshots");
        Ok(purged)
    }

    async fn insert_if_empty(&self, candidate: &CitySnapshot) -> Result<SeedOutcome, DbError> {
        let mut tx = self.pool().begin().await?;

        // Held until commit/rollback; concurrent seeders queue here.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEED_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, SnapshotRow>(
            r"SELECT id, taken_at, payload
              FROM city_snapshots
              ORDER BY taken_at DESC
              LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = existing {
            tx.commit().await?;
            return Ok(SeedOutcome::Existing(row.into_snapshot()?));
        }

        let payload = serde_json::to_value(candidate)?;
        sqlx::query(
            r"INSERT INTO city_snapshots (id, taken_at, payload)
              VALUES ($1, $2, $3)",
        )
        .bind(candidate.id.into_inner())
        .bind(candidate.timestamp)
        .bind(&payload)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(id = %candidate.id, "Seeded initial city snapshot");
        Ok(SeedOutcome::Inserted(candidate.clone()))
    }
}

/// A row from the `city_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SnapshotRow {
    /// Snapshot ID.
    pub id: Uuid,
    /// Generation time.
    pub taken_at: DateTime<Utc>,
    /// Full snapshot document.
    pub payload: serde_json::Value,
}

impl SnapshotRow {
    /// Decode the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the payload no longer matches
    /// [`CitySnapshot`].
    pub fn into_snapshot(self) -> Result<CitySnapshot, DbError> {
        Ok(serde_json::from_value(self.payload)?)
    }
}
