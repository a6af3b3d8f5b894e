//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use serde_json::json;
use thiserror::Error;

use crate::permission::Permission;
use crate::role::Role;

fn join_permissions(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejection produced by a deny decision.
///
/// `Display` is the operator-facing diagnostic and names the missing
/// permissions; use [`AccessError::client_body`] for anything sent to callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessError {
    /// No subject reached the guard.
    #[error("request carries no authenticated subject")]
    Unauthenticated,
    /// The subject's role claim is outside the registry.
    #[error("role `{role}` is not recognised")]
    UnknownRole {
        /// Raw claim as received.
        role: String,
    },
    /// The route only admits an explicit set of roles.
    #[error("role `{role}` is not one of [{}]", join_roles(.allowed))]
    RoleNotAllowed {
        /// Subject role.
        role: Role,
        /// Roles the route admits.
        allowed: Vec<Role>,
    },
    /// The subject lacks required permissions.
    #[error("role `{role}` is missing permissions [{}]", join_permissions(.missing))]
    MissingPermissions {
        /// Subject role.
        role: Role,
        /// Required permissions the role does not hold.
        missing: Vec<Permission>,
    },
    /// Route has no declared requirement and unguarded routes are denied.
    #[error("route declares no access requirement")]
    UnguardedRoute,
}

impl AccessError {
    /// HTTP-equivalent status for the routing layer.
    pub fn status_code(&self) -> u16 {
        match self {
            AccessError::Unauthenticated => 401,
            _ => 403,
        }
    }

    /// Body suitable for the client. Missing permissions are only listed when
    /// `expose_missing` is set.
    pub fn client_body(&self, expose_missing: bool) -> serde_json::Value {
        match self {
            AccessError::Unauthenticated => json!({
                "status": 401,
                "error": "unauthenticated",
            }),
            AccessError::MissingPermissions { missing, .. } if expose_missing => json!({
                "status": 403,
                "error": "forbidden",
                "missing_permissions": missing,
            }),
            _ => json!({
                "status": 403,
                "error": "forbidden",
            }),
        }
    }
}
