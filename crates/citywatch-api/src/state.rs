//! Shared application state for the REST API.
//!
//! [`AppState`] is wrapped in [`Arc`] and injected via Axum's `State`
//! extractor. It is generic over the storage backend so the same router
//! runs against `PostgreSQL` in production and the in-memory store in
//! tests.

use std::sync::Arc;
use std::time::Instant;

use citywatch_core::{SnapshotFactory, SnapshotReader};
use citywatch_db::Store;

use crate::auth::AccessControl;

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct AppState<S> {
    /// Storage backend for alerts, requests and emergencies.
    pub store: S,
    /// Latest/history snapshot reads with lazy seeding.
    pub reader: SnapshotReader<S>,
    /// API key lookup.
    pub access: AccessControl,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Process start, for the health endpoint's uptime.
    pub started_at: Instant,
}

impl<S: Store> AppState<S> {
    /// Create the state. `factory` is shared with the scheduler so both
    /// draw from one random source.
    pub fn new(
        store: S,
        factory: Arc<SnapshotFactory>,
        access: AccessControl,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            reader: SnapshotReader::new(store.clone(), factory),
            store,
            access,
            allowed_origins,
            started_at: Instant::now(),
        }
    }
}
