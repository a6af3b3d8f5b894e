//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Role-based access control for MentorLink.
//!
//! Roles and permissions are closed enumerations; the role → permission table
//! is compiled in and shared read-only. [`AuthorizationService`] answers every
//! question as a pure function of that table, and [`AccessGuard`] wraps it for
//! the routing layer. The same crate backs UI gating through [`Capabilities`].

pub mod assignment;
pub mod audit;
pub mod capabilities;
pub mod error;
pub mod guard;
pub mod metrics;
pub mod permission;
pub mod role;
pub mod service;
pub mod table;

pub use assignment::{AssignmentError, RoleAssignment, RoleAssignmentRequest};
pub use audit::{AuditEntry, AuditLog};
pub use capabilities::Capabilities;
pub use error::AccessError;
pub use guard::{
    AccessDecision, AccessGuard, DecisionReason, PermissionMatch, RouteRequirement, Subject,
};
pub use metrics::AccessMetrics;
pub use permission::{Permission, PermissionDomain};
pub use role::{has_hierarchy, Role, RoleClaim};
pub use service::{assignment_permitted, AccessPolicy, AuthorizationService};
pub use table::{PermissionSet, PermissionTable, PolicyStore, TableError};
