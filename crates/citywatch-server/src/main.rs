//! Service binary for CityWatch.
//!
//! Wires configuration, storage, the retention scheduler and the REST API
//! together and runs until `Ctrl-C` or `SIGTERM`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `citywatch-config.yaml` (or `CITYWATCH_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the selected storage backend and run migrations
//! 4. Insert the demo alert if it is missing
//! 5. Start the retention scheduler
//! 6. Serve the API until a shutdown signal arrives
//! 7. Stop the scheduler and close storage

mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use citywatch_api::auth::AccessControl;
use citywatch_api::state::AppState;
use citywatch_core::bootstrap::ensure_demo_alert;
use citywatch_core::config::LoggingConfig;
use citywatch_core::{
    CityConfig, RetentionCycle, RetentionScheduler, RngSource, SnapshotFactory,
    SnapshotGenerator, StorageBackend,
};
use citywatch_db::{MemoryStore, PostgresConfig, PostgresPool, Store};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Config file used when `CITYWATCH_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "citywatch-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, storage or the HTTP listener fail
/// during startup.
#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        path = %config_path.display(),
        city = %config.city.name,
        backend = ?config.storage.backend,
        tick_interval_secs = config.lifecycle.tick_interval_secs,
        retention_hours = config.lifecycle.retention_hours,
        api_keys = config.auth.api_keys.len(),
        "citywatch-server starting"
    );

    // 3. Open storage.
    match config.storage.backend {
        StorageBackend::Postgres => {
            let storage = &config.storage;
            let pg_config = PostgresConfig::new(&storage.postgres_url)
                .with_max_connections(storage.max_connections)
                .with_timeouts(storage.acquire_timeout(), storage.idle_timeout())
                .with_connect_attempts(storage.connect_attempts);
            let pool = PostgresPool::connect(&pg_config).await?;
            pool.run_migrations().await?;

            let result = run(&config, pool.clone()).await;
            pool.close().await;
            result?;
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            run(&config, MemoryStore::new()).await?;
        }
    }

    info!("citywatch-server shutdown complete");
    Ok(())
}

/// Steps 4-7, independent of the storage backend.
async fn run<S: Store>(config: &CityConfig, store: S) -> Result<(), ServerError> {
    let reference = config.city.reference_location;

    // 4. Demo alert.
    if ensure_demo_alert(&store, reference, Utc::now()).await? {
        info!("Demo alert created");
    }

    // 5. Scheduler. The factory is shared with the API's lazy seed.
    let factory = Arc::new(SnapshotFactory::new(
        SnapshotGenerator::new(reference),
        Box::new(RngSource::from_config(config.lifecycle.seed)),
    ));
    let cycle = RetentionCycle::new(
        store.clone(),
        Arc::clone(&factory),
        config.lifecycle.retention_horizon(),
        config.lifecycle.tick_timeout(),
    );
    let mut scheduler = RetentionScheduler::new(cycle, config.lifecycle.tick_interval());
    scheduler.start();

    // 6. API.
    let access = AccessControl::from_keys(&config.auth.api_keys);
    if access.is_empty() {
        tracing::warn!("No API keys configured; every authenticated route will reject");
    }
    let state = Arc::new(AppState::new(
        store,
        factory,
        access,
        config.server.allowed_origins.clone(),
    ));
    let served = citywatch_api::start_server(&config.server, state, shutdown_signal()).await;

    // 7. Stop the scheduler whether or not serving succeeded.
    scheduler.stop().await;
    served?;
    Ok(())
}

/// Path of the config file, from `CITYWATCH_CONFIG` or the default.
fn config_path() -> PathBuf {
    std::env::var_os("CITYWATCH_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the config file, falling back to defaults plus environment
/// overrides when it does not exist.
fn load_config(path: &Path) -> Result<CityConfig, ServerError> {
    if path.exists() {
        return Ok(CityConfig::from_file(path)?);
    }
    let mut config = CityConfig::default();
    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Resolves on the first of `Ctrl-C` or `SIGTERM`.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Shutdown signal received");
}
