//! Roles, permissions and the authenticated principal.
//!
//! How a caller proves who they are is outside this crate; once resolved,
//! a caller is a [`Principal`] carrying a permission list. Every gated route
//! names one [`Permission`], and [`Permission::All`] satisfies any of them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Role assigned to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Role {
    /// Full access.
    Admin,
    /// Control room staff.
    Operator,
    /// Read-only dashboard access.
    #[default]
    Viewer,
    /// Member of the public filing requests.
    Citizen,
}

impl Role {
    /// Default permission set granted to the role.
    pub fn default_permissions(self) -> Vec<Permission> {
        match self {
            Self::Admin => vec![Permission::All],
            Self::Operator => vec![Permission::View, Permission::Alerts, Permission::Emergency],
            Self::Viewer => vec![Permission::View],
            Self::Citizen => vec![Permission::Citizen],
        }
    }
}

/// A capability checked by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Permission {
    /// Wildcard; satisfies every check.
    All,
    /// Read city data and alerts.
    View,
    /// Create and edit alerts.
    Alerts,
    /// Read and report emergencies.
    Emergency,
    /// File citizen requests.
    Citizen,
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Principal {
    /// Account name, recorded on records the caller creates.
    pub name: String,
    /// Assigned role.
    pub role: Role,
    /// Effective permissions.
    pub permissions: Vec<Permission>,
}

impl Principal {
    /// Build a principal with the role's default permissions.
    pub fn with_role(name: &str, role: Role) -> Self {
        Self {
            name: name.to_owned(),
            role,
            permissions: role.default_permissions(),
        }
    }

    /// Whether the principal holds the wildcard permission.
    pub fn is_unrestricted(&self) -> bool {
        self.permissions.contains(&Permission::All)
    }

    /// Whether the principal may perform an operation gated by `required`.
    pub fn allows(&self, required: Permission) -> bool {
        self.is_unrestricted() || self.permissions.contains(&required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_allows_everything() {
        let admin = Principal::with_role("admin", Role::Admin);
        for perm in [
            Permission::View,
            Permission::Alerts,
            Permission::Emergency,
            Permission::Citizen,
            Permission::All,
        ] {
            assert!(admin.allows(perm), "admin denied {perm:?}");
        }
    }

    #[test]
    fn operator_cannot_file_citizen_requests() {
        let operator = Principal::with_role("ops", Role::Operator);
        assert!(operator.allows(Permission::Alerts));
        assert!(operator.allows(Permission::Emergency));
        assert!(!operator.allows(Permission::Citizen));
        assert!(!operator.allows(Permission::All));
    }

    #[test]
    fn viewer_is_read_only() {
        let viewer = Principal::with_role("demo", Role::Viewer);
        assert!(viewer.allows(Permission::View));
        assert!(!viewer.allows(Permission::Alerts));
        assert!(!viewer.is_unrestricted());
    }

    #[test]
    fn citizen_only_files_requests() {
        let citizen = Principal::with_role("resident", Role::Citizen);
        assert!(citizen.allows(Permission::Citizen));
        assert!(!citizen.allows(Permission::View));
    }
}
