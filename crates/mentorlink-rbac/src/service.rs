//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use std::sync::Arc;

use mentorlink_common::config::{AccessConfig, UnguardedPolicy};
use strum::IntoEnumIterator;

use crate::permission::Permission;
use crate::role::{has_hierarchy, Role, RoleClaim};
use crate::table::{PermissionSet, PermissionTable, PolicyStore};

/// Behaviour switches applied on top of the permission table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Outcome for routes that declare no requirement.
    pub unguarded_routes: UnguardedPolicy,
    /// Accept `coach`/`coachee` claims as `mentor`/`mentee`.
    pub legacy_role_aliases: bool,
    /// List missing permissions in client-facing 403 bodies.
    pub expose_missing_permissions: bool,
}

impl From<&AccessConfig> for AccessPolicy {
    fn from(config: &AccessConfig) -> Self {
        Self {
            unguarded_routes: config.unguarded_routes,
            legacy_role_aliases: config.legacy_role_aliases,
            expose_missing_permissions: config.expose_missing_permissions,
        }
    }
}

/// The assignment rules, evaluated in order with the first match winning.
///
/// Both [`AuthorizationService::can_assign_role`] and
/// [`AuthorizationService::assignable_roles`] go through this function.
pub fn assignment_permitted(assigner: Role, target: Role) -> bool {
    match (assigner, target) {
        (Role::SuperAdmin, _) => true,
        (Role::Admin, target) => target != Role::SuperAdmin,
        (Role::Coordinator, Role::Mentor | Role::Mentee | Role::Student) => true,
        (Role::Faculty, Role::Mentee | Role::Student) => true,
        _ => false,
    }
}

/// Pure authorization decisions over one permission table snapshot.
///
/// Every method accepts anything convertible into a [`RoleClaim`]: a typed
/// [`Role`], or a raw claim string. Raw strings are resolved with the same
/// alias policy as [`AuthorizationService::resolve`]. Unknown claims hold
/// nothing and pass no check.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    table: Arc<PermissionTable>,
    policy: AccessPolicy,
}

impl Default for AuthorizationService {
    fn default() -> Self {
        Self::builtin(AccessPolicy::default())
    }
}

impl AuthorizationService {
    /// Service over an explicit table.
    pub fn new(table: Arc<PermissionTable>, policy: AccessPolicy) -> Self {
        Self { table, policy }
    }

    /// Service over the compiled-in table.
    pub fn builtin(policy: AccessPolicy) -> Self {
        Self::new(PermissionTable::builtin(), policy)
    }

    /// Service pinned to the store's current snapshot.
    pub fn from_store(store: &PolicyStore, policy: AccessPolicy) -> Self {
        Self::new(store.snapshot(), policy)
    }

    /// Table snapshot this service decides against.
    pub fn table(&self) -> &Arc<PermissionTable> {
        &self.table
    }

    /// Active behaviour switches.
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Resolve a raw claim, honouring the legacy alias switch.
    pub fn resolve<'a>(&self, raw: &'a str) -> RoleClaim<'a> {
        RoleClaim::parse_with_aliases(raw, self.policy.legacy_role_aliases)
    }

    /// Normalise any claim through the alias policy. A strict parse has
    /// already run for raw strings, so only `Unknown` needs a second look.
    pub(crate) fn claim<'a>(&self, role: impl Into<RoleClaim<'a>>) -> RoleClaim<'a> {
        match role.into() {
            RoleClaim::Unknown(raw) => self.resolve(raw),
            known => known,
        }
    }

    /// Permissions held directly by `role`.
    pub fn permissions<'a>(&self, role: impl Into<RoleClaim<'a>>) -> &PermissionSet {
        self.table.permissions_of(self.claim(role))
    }

    /// Whether `role` holds `permission`.
    pub fn has_permission<'a>(&self, role: impl Into<RoleClaim<'a>>, permission: Permission) -> bool {
        self.permissions(role).contains(&permission)
    }

    /// At least one of `permissions` is held. An empty list yields `false`.
    pub fn has_any_permission<'a>(
        &self,
        role: impl Into<RoleClaim<'a>>,
        permissions: &[Permission],
    ) -> bool {
        let held = self.permissions(role);
        permissions.iter().any(|p| held.contains(p))
    }

    /// Every one of `permissions` is held. An empty list yields `true`.
    pub fn has_all_permissions<'a>(
        &self,
        role: impl Into<RoleClaim<'a>>,
        permissions: &[Permission],
    ) -> bool {
        let held = self.permissions(role);
        permissions.iter().all(|p| held.contains(p))
    }

    /// Hierarchy-aware: `user_role` is `required` or ranks above it.
    pub fn has_role<'a>(&self, user_role: impl Into<RoleClaim<'a>>, required: Role) -> bool {
        match self.claim(user_role) {
            // The equality arm is implied by the rank comparison; kept explicit.
            RoleClaim::Known(role) => role == required || has_hierarchy(role, required),
            RoleClaim::Unknown(_) => false,
        }
    }

    /// Exact membership of `user_role` in `roles`. Not hierarchy-aware.
    pub fn has_any_role<'a>(&self, user_role: impl Into<RoleClaim<'a>>, roles: &[Role]) -> bool {
        match self.claim(user_role) {
            RoleClaim::Known(role) => roles.contains(&role),
            RoleClaim::Unknown(_) => false,
        }
    }

    /// Admins and coordinators (and anyone ranked above them) may touch any
    /// resource; everyone else only resources they own.
    pub fn can_access_own_resource<'a>(
        &self,
        user_role: impl Into<RoleClaim<'a>>,
        resource_owner_id: &str,
        requesting_user_id: &str,
    ) -> bool {
        let claim = self.claim(user_role);
        if !claim.is_known() {
            return false;
        }
        if self.has_role(claim, Role::Admin) || self.has_role(claim, Role::Coordinator) {
            return true;
        }
        resource_owner_id == requesting_user_id
    }

    /// Base permissions plus `update_user` when the subject owns the resource.
    ///
    /// Returns an owned copy; the shared table is never touched.
    pub fn effective_permissions<'a>(
        &self,
        role: impl Into<RoleClaim<'a>>,
        user_id: Option<&str>,
        resource_owner_id: Option<&str>,
    ) -> PermissionSet {
        let claim = self.claim(role);
        let mut effective = self.permissions(claim).clone();
        let owns = matches!((user_id, resource_owner_id), (Some(user), Some(owner)) if user == owner);
        if owns && claim.is_known() {
            effective.insert(Permission::UpdateUser);
        }
        effective
    }

    /// Whether `assigner` may give `target` to a user.
    pub fn can_assign_role<'a>(&self, assigner: impl Into<RoleClaim<'a>>, target: Role) -> bool {
        match self.claim(assigner) {
            RoleClaim::Known(assigner) => assignment_permitted(assigner, target),
            RoleClaim::Unknown(_) => false,
        }
    }

    /// Roles `assigner` may hand out, in registry order.
    pub fn assignable_roles<'a>(&self, assigner: impl Into<RoleClaim<'a>>) -> Vec<Role> {
        let claim = self.claim(assigner);
        Role::iter()
            .filter(|target| self.can_assign_role(claim, *target))
            .collect()
    }
}
