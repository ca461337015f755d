//! Analytics report endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Permission | Description |
//! |--------|------|-----------|-------------|
//! | `GET` | `/api/analytics` | `all` | Reports newest first, optionally within `startDate..=endDate` |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::{DateTime, NaiveDate, Utc};
use citywatch_db::Store;
use citywatch_types::{AnalyticsReport, Permission};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /api/analytics`.
///
/// The range applies only when both bounds are present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    /// Inclusive lower bound, RFC 3339 or `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper bound, RFC 3339 or `YYYY-MM-DD`.
    pub end_date: Option<String>,
}

/// Parse a bound. A bare date means midnight UTC.
fn parse_bound(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ApiError::InvalidInput(format!("{field} must be a date, got {raw:?}")))
}

/// List analytics reports, newest first.
pub async fn list_analytics<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    caller: Caller,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<Vec<AnalyticsReport>>, ApiError> {
    caller.require(Permission::All)?;
    let Query(query) = query.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let range = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => Some((
            parse_bound("startDate", start)?,
            parse_bound("endDate", end)?,
        )),
        _ => None,
    };

    let reports = state.store.list_analytics(range).await?;
    Ok(Json(reports))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn bare_dates_are_midnight_utc() {
        let parsed = parse_bound("startDate", "2025-03-02").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn rfc3339_offsets_are_normalized() {
        let parsed = parse_bound("endDate", "2025-03-02T05:30:00+05:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_invalid_input() {
        assert!(matches!(
            parse_bound("startDate", "last tuesday"),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
