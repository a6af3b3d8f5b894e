//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::guard::Subject;
use crate::role::{Role, RoleClaim};
use crate::service::AuthorizationService;

/// A request to give `target_role` to `target_user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignmentRequest {
    /// Subject performing the change.
    pub assigner: Subject,
    /// User receiving the role.
    pub target_user_id: String,
    /// Role being handed out.
    pub target_role: Role,
}

/// Validated role change, ready to be persisted on the user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// User receiving the role.
    pub user_id: String,
    /// Role granted.
    pub role: Role,
    /// User who performed the change.
    pub assigned_by: String,
    /// Role the assigner acted under.
    pub assigner_role: Role,
    /// When validation succeeded.
    pub assigned_at: DateTime<Utc>,
}

/// Reasons a role assignment is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentError {
    /// Assigner presented a role outside the registry.
    #[error("assigner role `{0}` is not recognised")]
    UnknownAssignerRole(String),
    /// Policy does not let `assigner` hand out `target`.
    #[error("role `{assigner}` may not assign role `{target}`")]
    NotPermitted {
        /// Assigner role.
        assigner: Role,
        /// Requested role.
        target: Role,
    },
    /// No target user was named.
    #[error("target user id must not be empty")]
    EmptyTargetUser,
}

impl AuthorizationService {
    /// Validate a role change against the assignment rules.
    pub fn authorize_assignment(
        &self,
        request: &RoleAssignmentRequest,
    ) -> Result<RoleAssignment, AssignmentError> {
        if request.target_user_id.trim().is_empty() {
            return Err(AssignmentError::EmptyTargetUser);
        }
        let assigner_role = match self.resolve(&request.assigner.role) {
            RoleClaim::Known(role) => role,
            RoleClaim::Unknown(raw) => {
                warn!(assigner = %request.assigner.user_id, role = raw, "assignment by unknown role");
                return Err(AssignmentError::UnknownAssignerRole(raw.to_owned()));
            }
        };
        if !self.can_assign_role(assigner_role, request.target_role) {
            warn!(
                assigner = %request.assigner.user_id,
                assigner_role = %assigner_role,
                target = %request.target_user_id,
                target_role = %request.target_role,
                "role assignment refused"
            );
            return Err(AssignmentError::NotPermitted {
                assigner: assigner_role,
                target: request.target_role,
            });
        }
        debug!(
            assigner = %request.assigner.user_id,
            target = %request.target_user_id,
            target_role = %request.target_role,
            "role assignment validated"
        );
        Ok(RoleAssignment {
            user_id: request.target_user_id.clone(),
            role: request.target_role,
            assigned_by: request.assigner.user_id.clone(),
            assigner_role,
            assigned_at: Utc::now(),
        })
    }
}
