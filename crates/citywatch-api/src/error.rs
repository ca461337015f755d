//! Error types for the REST API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that can be
//! converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation. Every
//! error body has the same shape: `{"error": message, "status": code}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use citywatch_db::DbError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No bearer token on the request.
    #[error("Access token required")]
    Unauthorized,

    /// The bearer token does not match any configured key.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The caller lacks the permission the route requires.
    #[error("Insufficient permissions")]
    Forbidden,

    /// The requested resource was not found.
    #[error("{0}")]
    NotFound(String),

    /// The request was malformed or failed validation.
    #[error("{0}")]
    InvalidInput(String),

    /// The request body exceeded the configured limit.
    #[error("Request body too large")]
    PayloadTooLarge,

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            Self::Storage(e) => {
                tracing::error!(error = %e, "Request failed on storage");
                String::from("Internal server error")
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
