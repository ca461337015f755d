//! Snapshot lifecycle engine for the CityWatch monitoring platform.
//!
//! This crate owns everything between configuration and storage: it
//! synthesizes city snapshots, persists them on a fixed period, prunes those
//! older than the retention horizon, and serves the latest reading with a
//! race-free lazy seed.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `citywatch-config.yaml`
//! - [`random`] -- [`RandomSource`] trait and its implementations
//! - [`generator`] -- Snapshot generator and the shared [`SnapshotFactory`]
//! - [`scheduler`] -- Retention cycle and the periodic scheduler
//! - [`reader`] -- Latest/history reads with lazy seeding
//! - [`bootstrap`] -- Startup data
//!
//! [`RandomSource`]: random::RandomSource
//! [`SnapshotFactory`]: generator::SnapshotFactory

pub mod bootstrap;
pub mod config;
pub mod generator;
pub mod random;
pub mod reader;
pub mod scheduler;

pub use config::{CityConfig, ConfigError, StorageBackend};
pub use generator::{SnapshotFactory, SnapshotGenerator};
pub use random::{ConstantSource, RandomSource, RngSource};
pub use reader::SnapshotReader;
pub use scheduler::{
    RetentionCycle, RetentionScheduler, SchedulerState, TickError, TickOutcome, TickStage,
};
