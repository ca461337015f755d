//! Startup data that must exist before the API serves requests.

use chrono::{DateTime, Utc};
use citywatch_db::{AlertRepository, DbError};
use citywatch_types::{
    Alert, AlertCategory, AlertId, AlertKind, AlertLocation, AlertPriority, AlertStatus, GeoPoint,
};
use tracing::info;

/// Message of the demo traffic alert; also its identity for the
/// create-once check.
pub const DEMO_ALERT_MESSAGE: &str = "Major congestion on Marine Drive";

/// Create the demo traffic alert unless an alert with the same message
/// already exists. Returns whether it was created.
///
/// # Errors
///
/// Returns [`DbError`] if the store cannot be read or written.
pub async fn ensure_demo_alert<S: AlertRepository>(
    store: &S,
    reference: GeoPoint,
    now: DateTime<Utc>,
) -> Result<bool, DbError> {
    if store.find_alert_by_message(DEMO_ALERT_MESSAGE).await?.is_some() {
        return Ok(false);
    }

    let alert = Alert {
        id: AlertId::new(),
        kind: AlertKind::Critical,
        category: AlertCategory::Traffic,
        message: DEMO_ALERT_MESSAGE.to_owned(),
        location: Some(AlertLocation {
            description: String::from("Marine Drive, near Wankhede Stadium"),
            lat: reference.lat - 0.05,
            lng: reference.lng - 0.08,
        }),
        priority: AlertPriority::High,
        status: AlertStatus::Active,
        assigned_to: None,
        resolved_at: None,
        created_at: now,
        updated_at: now,
    };
    store.insert_alert(&alert).await?;

    info!(id = %alert.id, "Created demo traffic alert");
    Ok(true)
}
