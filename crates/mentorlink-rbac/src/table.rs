//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
//! The role → permission table.
//!
//! The compiled-in table below is the single source of truth for what each
//! role may do. It is built once per process and shared behind an [`Arc`];
//! nothing in this crate mutates a table after construction.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::info;

use crate::permission::Permission;
use crate::role::{Role, RoleClaim};

/// Permission set held by a role.
pub type PermissionSet = BTreeSet<Permission>;

static EMPTY: PermissionSet = BTreeSet::new();

static BUILTIN: Lazy<Arc<PermissionTable>> = Lazy::new(|| {
    let grants = Role::iter()
        .map(|role| (role, builtin_grants(role)))
        .collect::<IndexMap<_, _>>();
    Arc::new(PermissionTable::assemble(grants))
});

/// Hand-curated least-privilege grants. `SuperAdmin` is derived from the
/// full permission universe rather than listed.
fn builtin_grants(role: Role) -> PermissionSet {
    use Permission::*;
    let granted: &[Permission] = match role {
        Role::SuperAdmin => return Permission::iter().collect(),
        // Oversight and configuration; no content mutation on programs,
        // sessions, or goals.
        Role::Admin => &[
            CreateUser,
            ReadUser,
            UpdateUser,
            DeleteUser,
            ListUsers,
            ManageUserRoles,
            ReadProgram,
            ReadSession,
            ReadGoal,
            SendMessage,
            ReadMessage,
            DeleteMessage,
            SendAnnouncement,
            ManageNotifications,
            ViewReports,
            ExportReports,
            ViewAnalytics,
            ViewProgramAnalytics,
            ManageSystemSettings,
            ViewAuditLogs,
            ManageIntegrations,
            ManageBackups,
            ReadMatch,
            ReadFeedback,
            ManageFeedback,
            ViewLeaderboard,
            ManageGamification,
            ModerateContent,
            SuspendUser,
            ReactivateUser,
            BulkImportUsers,
        ],
        Role::Coordinator => &[
            ReadUser,
            ListUsers,
            CreateProgram,
            ReadProgram,
            UpdateProgram,
            PublishProgram,
            ManageProgramEnrollment,
            CreateSession,
            ReadSession,
            UpdateSession,
            ManageSessionAttendance,
            ReadGoal,
            SendMessage,
            ReadMessage,
            SendAnnouncement,
            ViewReports,
            ExportReports,
            ViewProgramAnalytics,
            CreateMatch,
            ReadMatch,
            UpdateMatch,
            DeleteMatch,
            ReadFeedback,
            ManageFeedback,
            AwardBadges,
            ViewLeaderboard,
            ModerateContent,
            BulkAssignMentors,
            ApproveMentorshipRequest,
            RejectMentorshipRequest,
            TrackMenteeProgress,
        ],
        Role::Faculty => &[
            ReadUser,
            ListUsers,
            ReadProgram,
            CreateSession,
            ReadSession,
            UpdateSession,
            ManageSessionAttendance,
            ReadGoal,
            SendMessage,
            ReadMessage,
            ViewReports,
            ViewProgramAnalytics,
            ReadMatch,
            SubmitFeedback,
            ReadFeedback,
            AwardBadges,
            ViewLeaderboard,
            BookSession,
            ConfirmSession,
            CancelSession,
            TrackMenteeProgress,
        ],
        Role::Mentor => &[
            ReadUser,
            ReadProgram,
            CreateSession,
            ReadSession,
            UpdateSession,
            ManageSessionAttendance,
            CreateGoal,
            ReadGoal,
            UpdateGoal,
            ManageGoalProgress,
            SendMessage,
            ReadMessage,
            ReadMatch,
            SubmitFeedback,
            ReadFeedback,
            AwardBadges,
            ViewLeaderboard,
            BookSession,
            ConfirmSession,
            CancelSession,
            ApproveMentorshipRequest,
            RejectMentorshipRequest,
            TrackMenteeProgress,
            ViewOwnProgress,
        ],
        Role::Mentee => &[
            ReadProgram,
            ReadSession,
            CreateGoal,
            ReadGoal,
            UpdateGoal,
            ManageGoalProgress,
            SendMessage,
            ReadMessage,
            ReadMatch,
            RequestMentor,
            SubmitFeedback,
            ViewLeaderboard,
            BookSession,
            CancelSession,
            ViewOwnProgress,
        ],
        Role::Student => &[
            ReadProgram,
            ReadSession,
            ReadGoal,
            SendMessage,
            ReadMessage,
            RequestMentor,
            SubmitFeedback,
            ViewLeaderboard,
            BookSession,
            ViewOwnProgress,
        ],
    };
    granted.iter().copied().collect()
}

/// Errors raised while building a replacement table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// `super_admin` must hold every defined permission.
    #[error("super_admin grants are incomplete; missing: {missing:?}")]
    IncompleteSuperAdmin {
        /// Permissions absent from the super_admin grant.
        missing: Vec<Permission>,
    },
}

/// Immutable role → permission mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTable {
    grants: IndexMap<Role, PermissionSet>,
}

impl PermissionTable {
    /// Shared handle to the compiled-in table.
    pub fn builtin() -> Arc<PermissionTable> {
        BUILTIN.clone()
    }

    /// Build a table from explicit grants, enforcing the super_admin invariant.
    /// Roles absent from `grants` hold nothing.
    pub fn from_grants<I, P>(grants: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (Role, P)>,
        P: IntoIterator<Item = Permission>,
    {
        let grants = grants
            .into_iter()
            .map(|(role, permissions)| (role, permissions.into_iter().collect()))
            .collect::<IndexMap<Role, PermissionSet>>();
        let super_admin = grants.get(&Role::SuperAdmin).unwrap_or(&EMPTY);
        let missing: Vec<Permission> = Permission::iter()
            .filter(|p| !super_admin.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(TableError::IncompleteSuperAdmin { missing });
        }
        Ok(Self::assemble(grants))
    }

    fn assemble(grants: IndexMap<Role, PermissionSet>) -> Self {
        Self { grants }
    }

    /// Permissions held by `role`; empty for unknown claims and absent roles.
    pub fn permissions_of<'a>(&self, role: impl Into<RoleClaim<'a>>) -> &PermissionSet {
        match role.into() {
            RoleClaim::Known(role) => self.grants.get(&role).unwrap_or(&EMPTY),
            RoleClaim::Unknown(_) => &EMPTY,
        }
    }

    /// Iterate `(role, permissions)` in registry order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &PermissionSet)> + '_ {
        Role::iter().map(move |role| (role, self.permissions_of(role)))
    }
}

/// Holder of the current table snapshot.
///
/// Readers take an [`Arc`] snapshot and keep it for the lifetime of a request;
/// [`PolicyStore::replace`] swaps in a whole new table without touching the old
/// one, so in-flight readers keep a consistent view.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<PermissionTable>>,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(PermissionTable::builtin())
    }
}

impl PolicyStore {
    /// Create a store seeded with `table`.
    pub fn new(table: Arc<PermissionTable>) -> Self {
        Self {
            current: RwLock::new(table),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<PermissionTable> {
        self.current.read().clone()
    }

    /// Replace the whole table, returning the previous snapshot.
    pub fn replace(&self, table: PermissionTable) -> Arc<PermissionTable> {
        let next = Arc::new(table);
        let previous = std::mem::replace(&mut *self.current.write(), next);
        info!("permission table snapshot replaced");
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_holds_exactly_the_universe() {
        let table = PermissionTable::builtin();
        let universe: PermissionSet = Permission::iter().collect();
        assert_eq!(table.permissions_of(Role::SuperAdmin), &universe);
    }

    #[test]
    fn unknown_claims_hold_nothing() {
        let table = PermissionTable::builtin();
        assert!(table.permissions_of("coach").is_empty());
        assert!(table.permissions_of("").is_empty());
        assert!(table.permissions_of(RoleClaim::Unknown("root")).is_empty());
    }

    #[test]
    fn admin_cannot_mutate_program_content() {
        let table = PermissionTable::builtin();
        let admin = table.permissions_of(Role::Admin);
        for denied in [
            Permission::CreateProgram,
            Permission::UpdateProgram,
            Permission::DeleteProgram,
            Permission::CreateSession,
            Permission::UpdateSession,
            Permission::DeleteSession,
            Permission::CreateGoal,
            Permission::UpdateGoal,
            Permission::DeleteGoal,
        ] {
            assert!(!admin.contains(&denied), "admin should not hold {denied}");
        }
        assert!(admin.contains(&Permission::ManageSystemSettings));
        assert!(admin.contains(&Permission::ViewAuditLogs));
    }

    #[test]
    fn every_role_is_a_subset_of_super_admin() {
        let table = PermissionTable::builtin();
        let universe = table.permissions_of(Role::SuperAdmin);
        for (role, permissions) in table.iter() {
            assert!(permissions.is_subset(universe), "{role}");
        }
    }

    #[test]
    fn mentee_lacks_update_user() {
        let table = PermissionTable::builtin();
        assert!(!table
            .permissions_of(Role::Mentee)
            .contains(&Permission::UpdateUser));
    }

    #[test]
    fn from_grants_requires_complete_super_admin() {
        let err = PermissionTable::from_grants([(Role::SuperAdmin, vec![Permission::ReadUser])])
            .unwrap_err();
        match err {
            TableError::IncompleteSuperAdmin { missing } => {
                assert!(missing.contains(&Permission::DeleteUser));
                assert!(!missing.contains(&Permission::ReadUser));
            }
        }
    }

    #[test]
    fn from_grants_leaves_absent_roles_empty() {
        let table = PermissionTable::from_grants([(Role::SuperAdmin, Permission::iter())]).unwrap();
        assert!(table.permissions_of(Role::Mentor).is_empty());
    }

    #[test]
    fn replace_keeps_old_snapshots_intact() {
        let store = PolicyStore::default();
        let before = store.snapshot();
        let narrowed = PermissionTable::from_grants([
            (Role::SuperAdmin, Permission::iter().collect::<Vec<_>>()),
            (Role::Student, vec![Permission::ReadProgram]),
        ])
        .unwrap();

        let previous = store.replace(narrowed);
        assert!(Arc::ptr_eq(&before, &previous));
        assert!(before
            .permissions_of(Role::Student)
            .contains(&Permission::BookSession));
        assert!(!store
            .snapshot()
            .permissions_of(Role::Student)
            .contains(&Permission::BookSession));
    }
}
