//! Read paths over stored snapshots.
//!
//! [`SnapshotReader::latest`] is the only place outside the scheduler that
//! creates a snapshot: when the store is empty it generates one and hands it
//! to [`SnapshotRepository::insert_if_empty`], so concurrent cold reads agree
//! on a single seed instead of each writing their own.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use citywatch_db::{DbError, SnapshotRepository};
use citywatch_types::CitySnapshot;
use tracing::debug;

use crate::generator::SnapshotFactory;

/// Latest and ranged snapshot reads with lazy seeding.
#[derive(Debug)]
pub struct SnapshotReader<S> {
    store: S,
    factory: Arc<SnapshotFactory>,
}

impl<S: SnapshotRepository> SnapshotReader<S> {
    /// Create a reader over `store`, seeding from `factory` when empty.
    pub const fn new(store: S, factory: Arc<SnapshotFactory>) -> Self {
        Self { store, factory }
    }

    /// The snapshot with the greatest timestamp, seeding one if the store
    /// holds none.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read or written.
    pub async fn latest(&self) -> Result<CitySnapshot, DbError> {
        if let Some(snapshot) = self.store.find_latest().await? {
            return Ok(snapshot);
        }

        let candidate = self.factory.next(Utc::now()).await;
        let outcome = self.store.insert_if_empty(&candidate).await?;
        if !outcome.was_inserted() {
            debug!("Lazy seed lost the race, serving existing snapshot");
        }
        Ok(outcome.into_snapshot())
    }

    /// Every snapshot from the last `hours` hours, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    pub async fn history(&self, hours: u32) -> Result<Vec<CitySnapshot>, DbError> {
        self.history_at(Utc::now(), hours).await
    }

    /// [`history`](Self::history) as of an explicit `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    pub async fn history_at(
        &self,
        now: DateTime<Utc>,
        hours: u32,
    ) -> Result<Vec<CitySnapshot>, DbError> {
        let since = now
            .checked_sub_signed(TimeDelta::hours(i64::from(hours)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.store.find_since(since).await
    }
}
