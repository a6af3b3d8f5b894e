//! ---
//! ml_section: "15-testing-qa"
//! ml_subsection: "integration-tests"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Integration and validation tests for the MentorLink access-control stack."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use std::sync::Arc;
use std::thread;

use mentorlink_common::config::{AppConfig, UnguardedPolicy};
use mentorlink_rbac::{
    AccessError, AccessGuard, AccessMetrics, AccessPolicy, AuditLog, AuthorizationService,
    DecisionReason, Permission, PermissionTable, PolicyStore, Role, RoleAssignmentRequest,
    RouteRequirement, Subject,
};
use strum::IntoEnumIterator;
use tempfile::tempdir;

#[test]
fn end_to_end_request_flow() {
    mentorlink_logging::init();
    let config = AppConfig::from_toml_str(
        r#"
        [access]
        unguarded_routes = "deny"
        legacy_role_aliases = true
        "#,
    )
    .unwrap();

    let registry = Arc::new(prometheus::Registry::new());
    let metrics = AccessMetrics::new(registry.clone()).unwrap();
    let guard = AccessGuard::new(AuthorizationService::builtin(AccessPolicy::from(
        &config.access,
    )))
    .with_metrics(metrics);

    // Legacy claim resolves, goal progress is allowed.
    let coach = Subject::new("u-10", "coach");
    let goals = RouteRequirement::permissions([Permission::ManageGoalProgress]);
    assert!(guard.check("PATCH /goals/:id/progress", Some(&coach), &goals).allowed);

    // Same subject cannot reach the audit trail; the diagnostic names the gap.
    let audit = RouteRequirement::permissions([Permission::ViewAuditLogs]);
    let denied = guard
        .check("GET /admin/audit", Some(&coach), &audit)
        .into_result()
        .unwrap_err();
    assert!(denied.to_string().contains("view_audit_logs"));
    let body = guard.client_body(&denied);
    assert!(body.get("missing_permissions").is_none());

    // Undeclared routes are closed under this config.
    let decision = guard.check("GET /internal", Some(&coach), &RouteRequirement::public());
    assert_eq!(decision.reason, DecisionReason::UnguardedRoute);

    // No subject at all.
    assert_eq!(
        guard.check("GET /me", None, &goals).into_result(),
        Err(AccessError::Unauthenticated)
    );

    // Refused assignments are counted alongside route decisions.
    let request = RoleAssignmentRequest {
        assigner: coach.clone(),
        target_user_id: "u-11".into(),
        target_role: Role::Admin,
    };
    assert!(guard.authorize_assignment(&request).is_err());
    let rejected: f64 = registry
        .gather()
        .iter()
        .filter(|family| family.get_name() == "role_assignments_rejected_total")
        .flat_map(|family| family.get_metric())
        .map(|metric| metric.get_counter().get_value())
        .sum();
    assert_eq!(rejected, 1.0);
}

#[test]
fn legacy_claims_agree_across_guard_and_service() {
    let config = AppConfig::from_toml_str("[access]\nlegacy_role_aliases = true\n").unwrap();
    let guard = AccessGuard::new(AuthorizationService::builtin(AccessPolicy::from(
        &config.access,
    )));
    let coach = Subject::new("u-20", "coach");
    let requirement = RouteRequirement::permissions([Permission::ManageGoalProgress]);

    let via_guard = guard.check("PATCH /goals/:id", Some(&coach), &requirement).allowed;
    let svc = guard.service();
    assert!(via_guard);
    assert_eq!(
        via_guard,
        svc.has_permission(coach.role.as_str(), Permission::ManageGoalProgress)
    );
    assert_eq!(svc.capabilities(coach.role.as_str()).role, Some(Role::Mentor));
    assert!(svc.can_access_own_resource(coach.role.as_str(), "u-20", &coach.user_id));
}

#[test]
fn ownership_layers_on_top_of_coarse_permissions() {
    let svc = AuthorizationService::default();
    let mentee = Subject::new("u-1", "mentee");

    let edit_profile = [Permission::UpdateUser];
    assert!(!svc.has_all_permissions(mentee.role.as_str(), &edit_profile));

    let own = svc.effective_permissions(mentee.role.as_str(), Some("u-1"), Some("u-1"));
    assert!(own.contains(&Permission::UpdateUser));
    assert!(svc.can_access_own_resource(mentee.role.as_str(), "u-1", &mentee.user_id));

    let other = svc.effective_permissions(mentee.role.as_str(), Some("u-1"), Some("u-2"));
    assert!(!other.contains(&Permission::UpdateUser));
    assert!(!svc.can_access_own_resource(mentee.role.as_str(), "u-2", &mentee.user_id));
    assert!(svc.can_access_own_resource(Role::Admin, "u-2", &mentee.user_id));
}

#[test]
fn concurrent_readers_never_see_self_service_grants() {
    let svc = AuthorizationService::default();
    thread::scope(|scope| {
        for worker in 0..8 {
            let svc = svc.clone();
            scope.spawn(move || {
                let id = format!("u-{worker}");
                for _ in 0..500 {
                    let effective = svc.effective_permissions(Role::Student, Some(id.as_str()), Some(id.as_str()));
                    assert!(effective.contains(&Permission::UpdateUser));
                    assert!(!svc.has_permission(Role::Student, Permission::UpdateUser));
                }
            });
        }
    });
    assert!(!PermissionTable::builtin()
        .permissions_of(Role::Student)
        .contains(&Permission::UpdateUser));
}

#[test]
fn snapshot_replacement_does_not_affect_pinned_services() {
    let store = PolicyStore::default();
    let pinned = AuthorizationService::from_store(&store, AccessPolicy::default());

    let locked_down = PermissionTable::from_grants(
        Role::iter().map(|role| match role {
            Role::SuperAdmin => (role, Permission::iter().collect::<Vec<_>>()),
            _ => (role, Vec::new()),
        }),
    )
    .unwrap();
    store.replace(locked_down);

    let fresh = AuthorizationService::from_store(&store, AccessPolicy::default());
    assert!(pinned.has_permission(Role::Mentor, Permission::ReadProgram));
    assert!(!fresh.has_permission(Role::Mentor, Permission::ReadProgram));
    assert!(fresh.has_permission(Role::SuperAdmin, Permission::ReadProgram));
}

#[test]
fn assignment_consistency_law_holds_for_every_pair() {
    let svc = AuthorizationService::default();
    for assigner in Role::iter() {
        let assignable = svc.assignable_roles(assigner);
        for target in Role::iter() {
            assert_eq!(
                assignable.contains(&target),
                svc.can_assign_role(assigner, target)
            );
        }
        let caps = svc.capabilities(assigner);
        assert_eq!(caps.assignable_roles, assignable);
    }
}

#[test]
fn assignment_workflow_is_audited() {
    let dir = tempdir().unwrap();
    let mut log = AuditLog::new(dir.path().join("assignments.log")).unwrap();
    let svc = AuthorizationService::default();

    let requests = [
        ("super_admin", Role::SuperAdmin, true),
        ("admin", Role::SuperAdmin, false),
        ("coordinator", Role::Student, true),
        ("faculty", Role::Faculty, false),
        ("ghost", Role::Student, false),
    ];
    for (index, (assigner_role, target_role, expected)) in requests.into_iter().enumerate() {
        let request = RoleAssignmentRequest {
            assigner: Subject::new("actor", assigner_role),
            target_user_id: format!("target-{index}"),
            target_role,
        };
        let outcome = svc.authorize_assignment(&request);
        assert_eq!(outcome.is_ok(), expected, "{assigner_role} -> {target_role}");
        log.record_assignment(&request, &outcome).unwrap();
    }
    assert_eq!(log.entries().unwrap().len(), requests.len());
    assert!(log.verify().unwrap());
}

#[test]
fn default_config_keeps_source_behaviour() {
    let config = AppConfig::from_toml_str("").unwrap();
    assert_eq!(config.access.unguarded_routes, UnguardedPolicy::Allow);
    let guard = AccessGuard::new(AuthorizationService::builtin(AccessPolicy::from(
        &config.access,
    )));
    let student = Subject::new("u-5", "student");
    assert!(guard.check("GET /", Some(&student), &RouteRequirement::public()).allowed);
    let coach = Subject::new("u-6", "coach");
    assert!(!guard.check("GET /", Some(&coach), &RouteRequirement::public()).allowed);
}
