//! Periodic snapshot generation and retention.
//!
//! [`RetentionCycle::run_once`] is one tick: produce a snapshot, persist it,
//! then purge everything older than the horizon. A failed persist skips the
//! purge for that tick; a failed purge leaves the new snapshot in place.
//! Neither failure escapes the tick.
//!
//! [`RetentionScheduler`] drives the cycle from a single task on a fixed
//! period. Ticks run back to back in that task, so they never overlap; a
//! tick that overruns the period causes the missed periods to be skipped
//! rather than fired in a burst.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use citywatch_db::{DbError, SnapshotRepository};
use citywatch_types::SnapshotId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::generator::SnapshotFactory;

/// Storage step of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStage {
    /// Writing the new snapshot.
    Persist,
    /// Deleting expired snapshots.
    Purge,
}

impl std::fmt::Display for TickStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist => f.write_str("persist"),
            Self::Purge => f.write_str("purge"),
        }
    }
}

/// Why a tick step failed.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The new snapshot could not be written.
    #[error("failed to persist snapshot: {0}")]
    Persist(#[source] DbError),

    /// Expired snapshots could not be deleted.
    #[error("failed to purge expired snapshots: {0}")]
    Purge(#[source] DbError),

    /// A storage step did not finish within the tick timeout.
    #[error("{stage} step timed out after {after:?}")]
    TimedOut {
        /// Which step stalled.
        stage: TickStage,
        /// The timeout that expired.
        after: Duration,
    },
}

/// What one tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Snapshot written and expired snapshots purged.
    Completed {
        /// ID of the snapshot written this tick.
        inserted: SnapshotId,
        /// How many expired snapshots were deleted.
        purged: u64,
    },
    /// The snapshot was not written; the purge was skipped.
    PersistFailed(TickError),
    /// The snapshot was written but the purge failed.
    PurgeFailed {
        /// ID of the snapshot written this tick.
        inserted: SnapshotId,
        /// The purge failure.
        error: TickError,
    },
}

impl TickOutcome {
    /// Whether every step succeeded.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// One generate, persist, purge pass over a snapshot store.
#[derive(Debug)]
pub struct RetentionCycle<S> {
    store: S,
    factory: Arc<SnapshotFactory>,
    horizon: TimeDelta,
    step_timeout: Duration,
}

impl<S: SnapshotRepository> RetentionCycle<S> {
    /// Create a cycle writing to `store`, keeping snapshots for `horizon`
    /// and bounding each storage step by `step_timeout`.
    pub const fn new(
        store: S,
        factory: Arc<SnapshotFactory>,
        horizon: TimeDelta,
        step_timeout: Duration,
    ) -> Self {
        Self {
            store,
            factory,
            horizon,
            step_timeout,
        }
    }

    /// The store this cycle writes to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run one tick as of `now`.
    pub async fn run_once(&self, now: DateTime<Utc>) -> TickOutcome {
        let snapshot = self.factory.next(now).await;
        let inserted = snapshot.id;

        let persisted = tokio::time::timeout(self.step_timeout, self.store.insert(&snapshot)).await;
        let persist_error = match persisted {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(TickError::Persist(e)),
            Err(_elapsed) => Some(TickError::TimedOut {
                stage: TickStage::Persist,
                after: self.step_timeout,
            }),
        };
        if let Some(error) = persist_error {
            warn!(
                timestamp = %now,
                error = %error,
                "Snapshot persist failed, skipping purge for this tick"
            );
            return TickOutcome::PersistFailed(error);
        }

        let cutoff = now
            .checked_sub_signed(self.horizon)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let purged =
            tokio::time::timeout(self.step_timeout, self.store.delete_older_than(cutoff)).await;
        let error = match purged {
            Ok(Ok(purged)) => {
                if purged > 0 {
                    info!(%cutoff, purged, "Purged expired snapshots");
                }
                debug!(id = %inserted, timestamp = %now, "Tick completed");
                return TickOutcome::Completed { inserted, purged };
            }
            Ok(Err(e)) => TickError::Purge(e),
            Err(_elapsed) => TickError::TimedOut {
                stage: TickStage::Purge,
                after: self.step_timeout,
            },
        };

        warn!(
            timestamp = %now,
            %cutoff,
            error = %error,
            "Snapshot purge failed, will retry next tick"
        );
        TickOutcome::PurgeFailed { inserted, error }
    }
}

/// Whether the scheduler task is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No task running.
    Stopped,
    /// Task running; a tick fires every period.
    Running,
}

struct RunningTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the periodic tick task.
pub struct RetentionScheduler<S> {
    cycle: Arc<RetentionCycle<S>>,
    period: Duration,
    task: Option<RunningTask>,
}

impl<S> RetentionScheduler<S>
where
    S: SnapshotRepository + 'static,
{
    /// Create a stopped scheduler ticking every `period` (at least 1 ms).
    pub fn new(cycle: RetentionCycle<S>, period: Duration) -> Self {
        Self {
            cycle: Arc::new(cycle),
            period: period.max(Duration::from_millis(1)),
            task: None,
        }
    }

    /// Current state.
    pub const fn state(&self) -> SchedulerState {
        if self.task.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Spawn the tick task. The first tick fires one full period from now.
    ///
    /// Returns `false` without doing anything if already running.
    pub fn start(&mut self) -> bool {
        if self.task.is_some() {
            return false;
        }

        let (shutdown, mut signal) = watch::channel(false);
        let cycle = Arc::clone(&self.cycle);
        let period = self.period;
        let first = Instant::now()
            .checked_add(period)
            .unwrap_or_else(Instant::now);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // Only the wait is cancellable; a started tick runs to the end.
                tokio::select! {
                    biased;
                    _ = signal.changed() => break,
                    _ = ticker.tick() => {}
                }
                let _outcome = cycle.run_once(Utc::now()).await;
            }

            debug!("Retention scheduler task exiting");
        });

        info!(period_secs = period.as_secs(), "Retention scheduler started");
        self.task = Some(RunningTask { shutdown, handle });
        true
    }

    /// Stop the tick task, waiting for an in-flight tick to finish.
    /// Calling this while stopped does nothing.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        // The receiver may already be gone if the task ended on its own.
        let _ = task.shutdown.send(true);
        if let Err(e) = task.handle.await {
            warn!(error = %e, "Retention scheduler task ended abnormally");
        }
        info!("Retention scheduler stopped");
    }
}

impl<S> std::fmt::Debug for RetentionScheduler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionScheduler")
            .field("period", &self.period)
            .field("running", &self.task.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use citywatch_db::{MemoryStore, SeedOutcome};
    use citywatch_types::{CitySnapshot, GeoPoint};

    use super::*;
    use crate::generator::SnapshotGenerator;
    use crate::random::{ConstantSource, RngSource};

    #[derive(Debug, Default)]
    struct Faults {
        fail_insert: AtomicBool,
        stall_purge: AtomicBool,
        purge_calls: AtomicUsize,
    }

    /// [`MemoryStore`] with switchable insert failures and purge stalls.
    #[derive(Debug, Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        faults: Arc<Faults>,
    }

    impl SnapshotRepository for FlakyStore {
        async fn find_latest(&self) -> Result<Option<CitySnapshot>, DbError> {
            self.inner.find_latest().await
        }

        async fn find_since(&self, since: DateTime<Utc>) -> Result<Vec<CitySnapshot>, DbError> {
            self.inner.find_since(since).await
        }

        async fn insert(&self, snapshot: &CitySnapshot) -> Result<(), DbError> {
            if self.faults.fail_insert.load(Ordering::SeqCst) {
                return Err(DbError::Config(String::from("injected insert failure")));
            }
            self.inner.insert(snapshot).await
        }

        async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, DbError> {
            self.faults.purge_calls.fetch_add(1, Ordering::SeqCst);
            if self.faults.stall_purge.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.inner.delete_older_than(cutoff).await
        }

        async fn insert_if_empty(&self, candidate: &CitySnapshot) -> Result<SeedOutcome, DbError> {
            self.inner.insert_if_empty(candidate).await
        }
    }

    fn factory() -> Arc<SnapshotFactory> {
        Arc::new(SnapshotFactory::new(
            SnapshotGenerator::new(GeoPoint::new(19.0760, 72.8777)),
            Box::new(RngSource::from_seed(7)),
        ))
    }

    fn cycle<S: SnapshotRepository>(store: S) -> RetentionCycle<S> {
        RetentionCycle::new(
            store,
            factory(),
            TimeDelta::hours(24),
            Duration::from_millis(50),
        )
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn retention_converges_after_one_tick() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let seed = SnapshotFactory::new(
            SnapshotGenerator::new(GeoPoint::new(19.0760, 72.8777)),
            Box::new(ConstantSource(0.5)),
        );
        for hours in [48, 25, 23, 1] {
            let s = seed.next(now - TimeDelta::hours(hours)).await;
            store.insert(&s).await.unwrap();
        }

        let outcome = cycle(store.clone()).run_once(now).await;
        assert!(matches!(outcome, TickOutcome::Completed { purged: 2, .. }));

        let remaining = store.find_since(DateTime::<Utc>::MIN_UTC).await.unwrap();
        let ages: Vec<TimeDelta> = remaining.iter().map(|s| now - s.timestamp).collect();
        assert_eq!(
            ages,
            [TimeDelta::hours(23), TimeDelta::hours(1), TimeDelta::zero()]
        );
    }

    #[tokio::test]
    async fn failed_persist_skips_purge_and_next_tick_recovers() {
        let store = FlakyStore::default();
        let cycle = cycle(store.clone());
        let now = Utc::now();

        store.faults.fail_insert.store(true, Ordering::SeqCst);
        let first = cycle.run_once(now).await;
        assert!(matches!(
            first,
            TickOutcome::PersistFailed(TickError::Persist(_))
        ));
        assert_eq!(store.faults.purge_calls.load(Ordering::SeqCst), 0);

        store.faults.fail_insert.store(false, Ordering::SeqCst);
        let second = cycle.run_once(now + TimeDelta::seconds(30)).await;
        assert!(second.is_completed());
        assert_eq!(store.faults.purge_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.snapshot_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_purge_times_out_without_losing_snapshot() {
        let store = FlakyStore::default();
        store.faults.stall_purge.store(true, Ordering::SeqCst);

        let outcome = cycle(store.clone()).run_once(Utc::now()).await;
        assert!(matches!(
            outcome,
            TickOutcome::PurgeFailed {
                error: TickError::TimedOut {
                    stage: TickStage::Purge,
                    ..
                },
                ..
            }
        ));
        assert_eq!(store.inner.snapshot_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_full_period() {
        let store = MemoryStore::new();
        let period = Duration::from_secs(30);
        let mut scheduler = RetentionScheduler::new(cycle(store.clone()), period);

        assert!(scheduler.start());
        settle().await;
        assert_eq!(store.snapshot_count().await, 0);

        tokio::time::advance(period - Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(store.snapshot_count().await, 0);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(store.snapshot_count().await, 1);

        tokio::time::advance(period).await;
        settle().await;
        assert_eq!(store.snapshot_count().await, 2);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_tick_does_not_stop_the_schedule() {
        let store = FlakyStore::default();
        let period = Duration::from_secs(30);
        let mut scheduler = RetentionScheduler::new(cycle(store.clone()), period);

        store.faults.fail_insert.store(true, Ordering::SeqCst);
        assert!(scheduler.start());

        tokio::time::advance(period).await;
        settle().await;
        assert_eq!(store.inner.snapshot_count().await, 0);
        assert_eq!(store.faults.purge_calls.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.state(), SchedulerState::Running);

        store.faults.fail_insert.store(false, Ordering::SeqCst);
        tokio::time::advance(period).await;
        settle().await;
        assert_eq!(store.inner.snapshot_count().await, 1);
        assert_eq!(store.faults.purge_calls.load(Ordering::SeqCst), 1);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_ticks() {
        let store = MemoryStore::new();
        let period = Duration::from_secs(30);
        let mut scheduler = RetentionScheduler::new(cycle(store.clone()), period);

        // Stopping a scheduler that never started is a no-op.
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        assert!(scheduler.start());
        assert!(!scheduler.start());
        assert_eq!(scheduler.state(), SchedulerState::Running);

        scheduler.stop().await;
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        tokio::time::advance(period * 3).await;
        settle().await;
        assert_eq!(store.snapshot_count().await, 0);

        // A stopped scheduler can be started again.
        assert!(scheduler.start());
        scheduler.stop().await;
    }
}
