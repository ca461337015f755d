//! Request body extraction with validation.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has passed its [`Validate`] rules.
///
/// Deserialization and validation failures are reported in the API's
/// standard error shape instead of Axum's plain-text rejection.
///
/// Gated handlers take `Result<ValidatedJson<T>, ApiError>` and unwrap it
/// after [`Caller::require`](crate::auth::Caller::require), so a caller
/// without the permission gets 403 whatever the body holds.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, St> FromRequest<St> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        value
            .validate()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::InvalidInput(rejection.body_text())
    }
}
