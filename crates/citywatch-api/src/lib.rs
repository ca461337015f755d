//! REST API for the city monitoring service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **City data** (`/api/city-data`, `/api/city-data/history`): the latest
//!   snapshot, seeded on first read, and a time window of history
//! - **Alerts** (`/api/alerts`): list, raise and update operator alerts
//! - **Incidents** (`/api/citizen-requests`, `/api/emergencies`): citizen
//!   service requests and emergency reports
//! - **Analytics** (`/api/analytics`): daily reports for administrators
//! - **Health** (`/api/health`): liveness and storage status
//!
//! # Authentication
//!
//! Every route except health requires `Authorization: Bearer <key>`. Keys
//! come from configuration and resolve to a principal with a role; see
//! [`auth::AccessControl`].
//!
//! # Storage
//!
//! [`AppState`] is generic over [`citywatch_db::Store`], so the same
//! router runs against `PostgreSQL` or the in-memory store.

pub mod alerts;
pub mod analytics;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod incidents;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use auth::{AccessControl, Caller};
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
