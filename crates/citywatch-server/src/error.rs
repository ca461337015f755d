//! Error types for the service binary.
//!
//! [`ServerError`] is the top-level error type that wraps all possible
//! failure modes during startup and serving.

/// Top-level error for the service binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: citywatch_core::ConfigError,
    },

    /// Connecting to or migrating the database failed.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying database error.
        #[from]
        source: citywatch_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("api error: {source}")]
    Api {
        /// The underlying server error.
        #[from]
        source: citywatch_api::ServerError,
    },
}
