//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
//! Serialisable capability view consumed by client-side UI gating.
//!
//! The UI uses this to hide or disable controls. The server-side guard stays
//! authoritative; nothing here grants access.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::role::{Role, RoleClaim};
use crate::service::AuthorizationService;

/// Everything the UI needs to know about one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Resolved role; `None` for an unknown claim.
    pub role: Option<Role>,
    /// Hierarchy rank, `0` for an unknown claim.
    pub rank: u8,
    /// Permissions held.
    pub permissions: BTreeSet<Permission>,
    /// Roles this role may hand out.
    pub assignable_roles: Vec<Role>,
}

impl Capabilities {
    /// Whether the UI should enable controls gated on `permission`.
    pub fn allows(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

impl AuthorizationService {
    /// Capability view for `role`.
    pub fn capabilities<'a>(&self, role: impl Into<RoleClaim<'a>>) -> Capabilities {
        let claim = self.claim(role);
        Capabilities {
            role: claim.role(),
            rank: claim.role().map(Role::rank).unwrap_or(0),
            permissions: self.permissions(claim).clone(),
            assignable_roles: self.assignable_roles(claim),
        }
    }
}
