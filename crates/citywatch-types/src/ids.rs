//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every stored record has a strongly-typed ID so a snapshot ID can never be
//! passed where an alert ID is expected. All IDs use UUID v7 (time-ordered),
//! which keeps primary-key inserts append-friendly in `PostgreSQL`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a city metrics snapshot.
    SnapshotId
}

define_id! {
    /// Unique identifier for an operator-facing alert.
    AlertId
}

define_id! {
    /// Unique identifier for a citizen service request.
    CitizenRequestId
}

define_id! {
    /// Unique identifier for an emergency incident.
    EmergencyId
}

define_id! {
    /// Unique identifier for a daily analytics report.
    AnalyticsId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = SnapshotId::new();
        let b = SnapshotId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = EmergencyId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }

    #[test]
    fn round_trips_through_uuid() {
        let raw = Uuid::now_v7();
        let id = CitizenRequestId::from(raw);
        assert_eq!(Uuid::from(id), raw);
        assert_eq!(id.to_string(), raw.to_string());
    }
}
