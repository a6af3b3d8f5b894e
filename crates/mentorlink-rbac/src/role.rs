//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Platform roles, declared from most to least privileged.
///
/// The derived `Ord` follows declaration order and exists for ordered
/// collections; privilege comparisons go through [`Role::rank`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// Unrestricted platform operator.
    SuperAdmin,
    /// Tenant administrator: oversight and system configuration.
    Admin,
    /// Runs programs and pairs mentors with mentees.
    Coordinator,
    /// Academic staff supervising mentees and students.
    Faculty,
    /// Guides mentees through sessions and goals.
    Mentor,
    /// Receives mentorship inside a program.
    Mentee,
    /// Enrolled learner without an active mentorship.
    Student,
}

impl Role {
    /// Fixed hierarchy rank in `[0, 100]`; higher is more privileged.
    pub const fn rank(self) -> u8 {
        match self {
            Role::SuperAdmin => 100,
            Role::Admin => 90,
            Role::Coordinator => 80,
            Role::Faculty => 70,
            Role::Mentor => 60,
            Role::Mentee => 50,
            Role::Student => 40,
        }
    }

    /// Canonical snake_case identifier.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// `true` when `user_role` sits at or above `required_role` in the hierarchy.
pub fn has_hierarchy(user_role: Role, required_role: Role) -> bool {
    user_role.rank() >= required_role.rank()
}

/// A role claim as handed over by the authentication layer.
///
/// Claims outside the registry are kept verbatim as [`RoleClaim::Unknown`] and
/// hold no permissions anywhere in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleClaim<'a> {
    /// A role from the registry.
    Known(Role),
    /// Anything else, e.g. a stale or misconfigured user record.
    Unknown(&'a str),
}

impl<'a> RoleClaim<'a> {
    /// Strict parse of a claim against the canonical identifiers.
    pub fn parse(raw: &'a str) -> Self {
        match Role::from_str(raw) {
            Ok(role) => RoleClaim::Known(role),
            Err(_) => RoleClaim::Unknown(raw),
        }
    }

    /// Parse a claim, optionally accepting the legacy `coach`/`coachee` names.
    pub fn parse_with_aliases(raw: &'a str, legacy_aliases: bool) -> Self {
        if legacy_aliases {
            match raw {
                "coach" => return RoleClaim::Known(Role::Mentor),
                "coachee" => return RoleClaim::Known(Role::Mentee),
                _ => {}
            }
        }
        Self::parse(raw)
    }

    /// The resolved role, if the claim is known.
    pub fn role(self) -> Option<Role> {
        match self {
            RoleClaim::Known(role) => Some(role),
            RoleClaim::Unknown(_) => None,
        }
    }

    /// Whether the claim resolved to a registry role.
    pub fn is_known(self) -> bool {
        matches!(self, RoleClaim::Known(_))
    }
}

impl From<Role> for RoleClaim<'_> {
    fn from(role: Role) -> Self {
        RoleClaim::Known(role)
    }
}

impl<'a> From<&'a str> for RoleClaim<'a> {
    fn from(raw: &'a str) -> Self {
        RoleClaim::parse(raw)
    }
}

impl<'a> From<&'a String> for RoleClaim<'a> {
    fn from(raw: &'a String) -> Self {
        RoleClaim::parse(raw.as_str())
    }
}

impl fmt::Display for RoleClaim<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleClaim::Known(role) => f.write_str(role.as_str()),
            RoleClaim::Unknown(raw) => f.write_str(raw),
        }
    }
}
