//! Storage layer for the CityWatch monitoring platform.
//!
//! Two interchangeable backends sit behind the traits in [`repository`]:
//!
//! ```text
//! Lifecycle engine / API
//!     |
//!     +-- Store (trait bundle)
//!         |-- PostgresPool  (JSONB documents, advisory-locked seeding)
//!         +-- MemoryStore   (single RwLock, development and tests)
//! ```
//!
//! # Modules
//!
//! - [`repository`] -- Storage traits and the [`Store`] bundle
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`snapshot_store`] -- Snapshot persistence on `PostgreSQL`
//! - [`record_store`] -- Alert, citizen request, emergency and analytics persistence
//! - [`memory`] -- In-process backend
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record_store;
pub mod repository;
pub mod snapshot_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory::MemoryStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use record_store::DocumentRow;
pub use repository::{
    AlertRepository, AnalyticsRepository, CitizenRequestRepository, EmergencyRepository,
    HealthCheck, SeedOutcome, SnapshotRepository, Store,
};
pub use snapshot_store::SnapshotRow;
