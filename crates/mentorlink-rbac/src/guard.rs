//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
//! Route-level evaluation: declared requirements in, a plain-data decision out.

use std::collections::BTreeSet;

use mentorlink_common::config::UnguardedPolicy;
use mentorlink_logging::{log_access_event, ml_warn, AccessOutcome, LogContext};
use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::assignment::{AssignmentError, RoleAssignment, RoleAssignmentRequest};
use crate::error::AccessError;
use crate::metrics::AccessMetrics;
use crate::permission::Permission;
use crate::role::{Role, RoleClaim};
use crate::service::AuthorizationService;

/// Authenticated identity handed over by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable user identifier.
    pub user_id: String,
    /// Role claim exactly as stored on the user record.
    pub role: String,
}

impl Subject {
    /// Build a subject from its parts.
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }
}

/// How a requirement's permission list is combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMatch {
    /// Every listed permission is required.
    #[default]
    All,
    /// Any one listed permission suffices.
    Any,
}

/// Access metadata declared on a route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequirement {
    /// Required permissions.
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    /// Combination rule for `permissions`.
    #[serde(default)]
    pub permission_match: PermissionMatch,
    /// Allowlist of roles, matched exactly.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl RouteRequirement {
    /// A route with no declared requirement.
    pub fn public() -> Self {
        Self::default()
    }

    /// Require every permission in `permissions`.
    pub fn permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Admit only the listed roles.
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Accept any one of the listed permissions instead of all of them.
    pub fn any(mut self) -> Self {
        self.permission_match = PermissionMatch::Any;
        self
    }

    /// Additionally restrict the route to the listed roles.
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles.extend(roles);
        self
    }

    /// Whether nothing is declared.
    pub fn is_public(&self) -> bool {
        self.permissions.is_empty() && self.roles.is_empty()
    }
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DecisionReason {
    /// All declared requirements were met.
    Granted,
    /// Nothing was declared and unguarded routes are allowed.
    PublicRoute,
    /// No subject was supplied.
    Unauthenticated,
    /// The role claim is outside the registry.
    UnknownRole,
    /// The role is not on the route's allowlist.
    RoleNotAllowed,
    /// Required permissions are not held.
    MissingPermissions,
    /// Nothing was declared and unguarded routes are denied.
    UnguardedRoute,
}

/// Outcome of evaluating one subject against one route requirement.
///
/// Computed once per request and passed down as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Decision reason.
    pub reason: DecisionReason,
    /// Raw role claim of the subject, if any.
    pub role_claim: Option<String>,
    /// Resolved role, when the claim is known.
    pub role: Option<Role>,
    /// Required permissions the subject lacks, sorted.
    pub missing_permissions: Vec<Permission>,
    /// Roles the route admits, when it declares an allowlist.
    pub allowed_roles: Vec<Role>,
}

impl AccessDecision {
    fn allow(reason: DecisionReason, subject: Option<&Subject>, role: Option<Role>) -> Self {
        Self {
            allowed: true,
            reason,
            role_claim: subject.map(|s| s.role.clone()),
            role,
            missing_permissions: Vec::new(),
            allowed_roles: Vec::new(),
        }
    }

    fn deny(reason: DecisionReason, subject: Option<&Subject>, role: Option<Role>) -> Self {
        Self {
            allowed: false,
            ..Self::allow(reason, subject, role)
        }
    }

    /// Convert into a `Result` for `?` propagation in handlers.
    pub fn into_result(self) -> Result<(), AccessError> {
        if self.allowed {
            return Ok(());
        }
        Err(match (self.reason, self.role) {
            (DecisionReason::Unauthenticated, _) => AccessError::Unauthenticated,
            (DecisionReason::UnguardedRoute, _) => AccessError::UnguardedRoute,
            (DecisionReason::RoleNotAllowed, Some(role)) => AccessError::RoleNotAllowed {
                role,
                allowed: self.allowed_roles,
            },
            (DecisionReason::MissingPermissions, Some(role)) => AccessError::MissingPermissions {
                role,
                missing: self.missing_permissions,
            },
            _ => AccessError::UnknownRole {
                role: self.role_claim.unwrap_or_default(),
            },
        })
    }
}

impl AuthorizationService {
    /// Decide whether `subject` satisfies `requirement`. Pure; no logging.
    pub fn evaluate(&self, subject: Option<&Subject>, requirement: &RouteRequirement) -> AccessDecision {
        let Some(subject) = subject else {
            return AccessDecision::deny(DecisionReason::Unauthenticated, None, None);
        };

        let claim = self.resolve(&subject.role);
        let RoleClaim::Known(role) = claim else {
            let mut decision = AccessDecision::deny(DecisionReason::UnknownRole, Some(subject), None);
            decision.missing_permissions = requirement.permissions.iter().copied().collect();
            return decision;
        };

        if requirement.is_public() {
            return match self.policy().unguarded_routes {
                UnguardedPolicy::Allow => {
                    AccessDecision::allow(DecisionReason::PublicRoute, Some(subject), Some(role))
                }
                UnguardedPolicy::Deny => {
                    AccessDecision::deny(DecisionReason::UnguardedRoute, Some(subject), Some(role))
                }
            };
        }

        if !requirement.roles.is_empty() {
            let allowed: Vec<Role> = requirement.roles.iter().copied().collect();
            if !self.has_any_role(role, &allowed) {
                let mut decision =
                    AccessDecision::deny(DecisionReason::RoleNotAllowed, Some(subject), Some(role));
                decision.allowed_roles = allowed;
                return decision;
            }
        }

        if !requirement.permissions.is_empty() {
            let required: Vec<Permission> = requirement.permissions.iter().copied().collect();
            let satisfied = match requirement.permission_match {
                PermissionMatch::All => self.has_all_permissions(role, &required),
                PermissionMatch::Any => self.has_any_permission(role, &required),
            };
            if !satisfied {
                let held = self.permissions(role);
                let mut decision = AccessDecision::deny(
                    DecisionReason::MissingPermissions,
                    Some(subject),
                    Some(role),
                );
                decision.missing_permissions =
                    required.into_iter().filter(|p| !held.contains(p)).collect();
                return decision;
            }
        }

        AccessDecision::allow(DecisionReason::Granted, Some(subject), Some(role))
    }
}

/// Wraps [`AuthorizationService::evaluate`] with logging and metrics for use
/// by the routing layer.
#[derive(Clone)]
pub struct AccessGuard {
    service: AuthorizationService,
    metrics: Option<AccessMetrics>,
}

impl AccessGuard {
    /// Guard over `service` without metrics.
    pub fn new(service: AuthorizationService) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    /// Attach Prometheus counters.
    pub fn with_metrics(mut self, metrics: AccessMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Underlying service.
    pub fn service(&self) -> &AuthorizationService {
        &self.service
    }

    /// Evaluate, log, and count a decision for `route`.
    pub fn check(
        &self,
        route: &str,
        subject: Option<&Subject>,
        requirement: &RouteRequirement,
    ) -> AccessDecision {
        let decision = self.service.evaluate(subject, requirement);

        let mut context = LogContext::new().with_route(route);
        if let Some(subject) = subject {
            context = context.with_user(&subject.user_id).with_role(&subject.role);
        }
        let outcome = if decision.allowed {
            AccessOutcome::Allowed
        } else {
            AccessOutcome::Denied
        };
        log_access_event(Some(&context), "access.check", decision.reason.as_ref(), outcome);
        if decision.reason == DecisionReason::PublicRoute {
            ml_warn!(
                context = context,
                "route declares no access requirement; treated as public"
            );
        }

        if let Some(metrics) = &self.metrics {
            if decision.allowed {
                metrics.inc_allowed();
            } else {
                metrics.inc_denied(decision.reason.as_ref());
            }
            if decision.reason == DecisionReason::UnknownRole {
                metrics.inc_unknown_role();
            }
        }
        decision
    }

    /// Client-facing body for a rejection, redacted per the service policy.
    pub fn client_body(&self, error: &AccessError) -> serde_json::Value {
        error.client_body(self.service.policy().expose_missing_permissions)
    }

    /// Validate a role change, logging the outcome and counting refusals.
    pub fn authorize_assignment(
        &self,
        request: &RoleAssignmentRequest,
    ) -> Result<RoleAssignment, AssignmentError> {
        let outcome = self.service.authorize_assignment(request);
        let context = LogContext::new()
            .with_user(&request.assigner.user_id)
            .with_role(&request.assigner.role)
            .with_route("role.assign");
        match &outcome {
            Ok(_) => log_access_event(Some(&context), "role.assign", "granted", AccessOutcome::Allowed),
            Err(err) => {
                let reason = match err {
                    AssignmentError::UnknownAssignerRole(_) => "unknown_role",
                    AssignmentError::NotPermitted { .. } => "not_permitted",
                    AssignmentError::EmptyTargetUser => "empty_target_user",
                };
                log_access_event(Some(&context), "role.assign", reason, AccessOutcome::Denied);
                if let Some(metrics) = &self.metrics {
                    metrics.inc_assignment_rejected();
                    if matches!(err, AssignmentError::UnknownAssignerRole(_)) {
                        metrics.inc_unknown_role();
                    }
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::AccessPolicy;
    use crate::table::PermissionTable;
    use prometheus::Registry;
    use std::sync::Arc;

    fn guard() -> AccessGuard {
        AccessGuard::new(AuthorizationService::default())
    }

    #[test]
    fn missing_subject_is_unauthenticated() {
        let decision = guard().check("/users", None, &RouteRequirement::public());
        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::Unauthenticated);
        assert_eq!(decision.into_result(), Err(AccessError::Unauthenticated));
    }

    #[test]
    fn unknown_role_fails_closed_even_on_public_routes() {
        let subject = Subject::new("u1", "coach");
        let decision = guard().check("/health", Some(&subject), &RouteRequirement::public());
        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::UnknownRole);
        assert_eq!(
            decision.into_result(),
            Err(AccessError::UnknownRole {
                role: "coach".into()
            })
        );
    }

    #[test]
    fn unknown_role_reports_every_required_permission() {
        let subject = Subject::new("u1", "root");
        let requirement = RouteRequirement::permissions([Permission::ReadUser, Permission::ListUsers]);
        let decision = guard().check("/users", Some(&subject), &requirement);
        assert_eq!(
            decision.missing_permissions,
            vec![Permission::ReadUser, Permission::ListUsers]
        );
    }

    #[test]
    fn public_routes_follow_policy() {
        let subject = Subject::new("u1", "student");
        let open = guard().check("/", Some(&subject), &RouteRequirement::public());
        assert!(open.allowed);
        assert_eq!(open.reason, DecisionReason::PublicRoute);

        let closed = AccessGuard::new(AuthorizationService::new(
            PermissionTable::builtin(),
            AccessPolicy {
                unguarded_routes: UnguardedPolicy::Deny,
                ..AccessPolicy::default()
            },
        ))
        .check("/", Some(&subject), &RouteRequirement::public());
        assert!(!closed.allowed);
        assert_eq!(closed.into_result(), Err(AccessError::UnguardedRoute));
    }

    #[test]
    fn missing_permissions_are_listed() {
        let subject = Subject::new("u1", "mentee");
        let requirement = RouteRequirement::permissions([
            Permission::ReadProgram,
            Permission::DeleteUser,
            Permission::ViewAuditLogs,
        ]);
        let decision = guard().check("/admin/users", Some(&subject), &requirement);
        assert!(!decision.allowed);
        assert_eq!(
            decision.missing_permissions,
            vec![Permission::DeleteUser, Permission::ViewAuditLogs]
        );
        match decision.into_result() {
            Err(AccessError::MissingPermissions { role, missing }) => {
                assert_eq!(role, Role::Mentee);
                assert_eq!(missing.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn any_match_needs_one_permission() {
        let subject = Subject::new("u1", "student");
        let requirement =
            RouteRequirement::permissions([Permission::ReadProgram, Permission::DeleteProgram]).any();
        assert!(guard().check("/programs", Some(&subject), &requirement).allowed);

        let none_held =
            RouteRequirement::permissions([Permission::DeleteProgram, Permission::ManageBackups]).any();
        let decision = guard().check("/programs", Some(&subject), &none_held);
        assert_eq!(decision.missing_permissions.len(), 2);
    }

    #[test]
    fn role_allowlist_is_exact() {
        let requirement = RouteRequirement::roles([Role::Admin, Role::Coordinator]);
        let mentor = Subject::new("u1", "mentor");
        let super_admin = Subject::new("u2", "super_admin");
        let coordinator = Subject::new("u3", "coordinator");

        let denied = guard().check("/reports", Some(&mentor), &requirement);
        assert_eq!(denied.reason, DecisionReason::RoleNotAllowed);
        assert_eq!(denied.allowed_roles, vec![Role::Admin, Role::Coordinator]);
        assert!(!guard().check("/reports", Some(&super_admin), &requirement).allowed);
        assert!(guard().check("/reports", Some(&coordinator), &requirement).allowed);
    }

    #[test]
    fn roles_and_permissions_combine() {
        let requirement = RouteRequirement::permissions([Permission::CreateProgram])
            .with_roles([Role::Admin, Role::Coordinator]);
        let admin = Subject::new("u1", "admin");
        let decision = guard().check("/programs", Some(&admin), &requirement);
        assert_eq!(decision.reason, DecisionReason::MissingPermissions);

        let coordinator = Subject::new("u2", "coordinator");
        assert!(guard().check("/programs", Some(&coordinator), &requirement).allowed);
    }

    #[test]
    fn decisions_serialise_as_plain_data() {
        let subject = Subject::new("u1", "faculty");
        let decision = guard().check(
            "/sessions",
            Some(&subject),
            &RouteRequirement::permissions([Permission::DeleteSession]),
        );
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["reason"], "missing_permissions");
        assert_eq!(json["missing_permissions"][0], "delete_session");
        assert_eq!(json["role"], "faculty");
    }

    #[test]
    fn requirement_deserialises_from_route_metadata() {
        let requirement: RouteRequirement = serde_json::from_str(
            r#"{"permissions": ["read_goal", "update_goal"], "permission_match": "any"}"#,
        )
        .unwrap();
        assert_eq!(requirement.permission_match, PermissionMatch::Any);
        assert_eq!(requirement.permissions.len(), 2);
        assert!(requirement.roles.is_empty());
    }

    #[test]
    fn guard_counts_decisions() {
        let registry = Arc::new(Registry::new());
        let metrics = AccessMetrics::new(registry.clone()).unwrap();
        let guard = guard().with_metrics(metrics);

        let mentee = Subject::new("u1", "mentee");
        let stale = Subject::new("u2", "coachee");
        guard.check("/goals", Some(&mentee), &RouteRequirement::permissions([Permission::ReadGoal]));
        guard.check("/users", Some(&mentee), &RouteRequirement::permissions([Permission::DeleteUser]));
        guard.check("/goals", Some(&stale), &RouteRequirement::permissions([Permission::ReadGoal]));

        let families = registry.gather();
        let value = |name: &str| -> f64 {
            families
                .iter()
                .filter(|f| f.get_name() == name)
                .flat_map(|f| f.get_metric())
                .map(|m| m.get_counter().get_value())
                .sum()
        };
        assert_eq!(value("access_decisions_allowed_total"), 1.0);
        assert_eq!(value("access_decisions_denied_total"), 2.0);
        assert_eq!(value("access_unknown_role_total"), 1.0);
    }

    fn counter(registry: &Registry, name: &str) -> f64 {
        registry
            .gather()
            .iter()
            .filter(|f| f.get_name() == name)
            .flat_map(|f| f.get_metric())
            .map(|m| m.get_counter().get_value())
            .sum()
    }

    fn assignment(assigner_role: &str, target_role: Role) -> RoleAssignmentRequest {
        RoleAssignmentRequest {
            assigner: Subject::new("actor", assigner_role),
            target_user_id: "target".into(),
            target_role,
        }
    }

    #[test]
    fn guard_counts_rejected_assignments() {
        let metrics = AccessMetrics::new(Arc::new(Registry::new())).unwrap();
        let registry = metrics.registry();
        let guard = guard().with_metrics(metrics);

        assert!(guard.authorize_assignment(&assignment("coordinator", Role::Mentor)).is_ok());
        assert_eq!(
            guard.authorize_assignment(&assignment("coordinator", Role::Admin)),
            Err(AssignmentError::NotPermitted {
                assigner: Role::Coordinator,
                target: Role::Admin,
            })
        );
        assert!(guard.authorize_assignment(&assignment("headmaster", Role::Student)).is_err());

        assert_eq!(counter(&registry, "role_assignments_rejected_total"), 2.0);
        assert_eq!(counter(&registry, "access_unknown_role_total"), 1.0);
        assert_eq!(counter(&registry, "access_decisions_allowed_total"), 0.0);
    }

    #[test]
    fn client_body_follows_policy() {
        let subject = Subject::new("u1", "student");
        let requirement = RouteRequirement::permissions([Permission::CreateProgram]);

        let redacted = guard();
        let err = redacted
            .check("/programs", Some(&subject), &requirement)
            .into_result()
            .unwrap_err();
        assert!(redacted.client_body(&err).get("missing_permissions").is_none());

        let verbose = AccessGuard::new(AuthorizationService::builtin(AccessPolicy {
            expose_missing_permissions: true,
            ..AccessPolicy::default()
        }));
        assert_eq!(verbose.client_body(&err)["missing_permissions"][0], "create_program");
    }
}
