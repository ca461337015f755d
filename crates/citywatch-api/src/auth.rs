//! Bearer-key authentication and permission checks.
//!
//! Keys are opaque strings declared in configuration. A request carrying
//! `Authorization: Bearer <key>` is resolved to the [`Principal`] the key
//! maps to; handlers then call [`Caller::require`] with the permission the
//! route needs.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use citywatch_core::config::ApiKeyConfig;
use citywatch_db::Store;
use citywatch_types::{Permission, Principal};

use crate::error::ApiError;
use crate::state::AppState;

/// Key to principal lookup.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    principals: BTreeMap<String, Principal>,
}

impl AccessControl {
    /// Build the lookup from configured keys. Each key gets its role's
    /// default permissions.
    pub fn from_keys(keys: &[ApiKeyConfig]) -> Self {
        let principals = keys
            .iter()
            .map(|entry| {
                (
                    entry.key.clone(),
                    Principal::with_role(&entry.name, entry.role),
                )
            })
            .collect();
        Self { principals }
    }

    /// Principal for `token`, if the key is known.
    pub fn resolve(&self, token: &str) -> Option<&Principal> {
        self.principals.get(token)
    }

    /// Number of configured keys.
    pub fn len(&self) -> usize {
        self.principals.len()
    }

    /// Whether no keys are configured.
    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

/// The authenticated principal behind a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl Caller {
    /// Reject with 403 unless the caller holds `permission` (or `all`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] when the permission is missing.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if self.0.allows(permission) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Account name of the caller.
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

/// Extract the token from an `Authorization` header value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl<S: Store> FromRequestParts<Arc<AppState<S>>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        state
            .access
            .resolve(token)
            .cloned()
            .map(Self)
            .ok_or(ApiError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use citywatch_types::Role;

    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn keys_resolve_to_role_permissions() {
        let access = AccessControl::from_keys(&[ApiKeyConfig {
            key: String::from("k1"),
            name: String::from("ops"),
            role: Role::Operator,
        }]);
        let principal = access.resolve("k1");
        assert_eq!(principal.map(|p| p.name.as_str()), Some("ops"));
        assert!(principal.is_some_and(|p| p.allows(Permission::Alerts)));
        assert!(access.resolve("k2").is_none());
        assert_eq!(access.len(), 1);
    }

    #[test]
    fn require_checks_permission() {
        let caller = Caller(Principal::with_role("demo", Role::Viewer));
        assert!(caller.require(Permission::View).is_ok());
        assert!(matches!(
            caller.require(Permission::Alerts),
            Err(ApiError::Forbidden)
        ));
    }
}
