//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

/// Atomic capabilities granted to roles. Permissions carry no hierarchy.
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
pub enum Permission {
    // User
    /// Create user accounts.
    CreateUser,
    /// Read user profiles.
    ReadUser,
    /// Update user profiles.
    UpdateUser,
    /// Delete user accounts.
    DeleteUser,
    /// List and search users.
    ListUsers,
    /// Change the role attached to a user.
    ManageUserRoles,

    // Program
    /// Create mentorship programs.
    CreateProgram,
    /// Read program details.
    ReadProgram,
    /// Edit program details.
    UpdateProgram,
    /// Delete programs.
    DeleteProgram,
    /// Publish or archive programs.
    PublishProgram,
    /// Enroll and remove program participants.
    ManageProgramEnrollment,

    // Session
    /// Schedule sessions.
    CreateSession,
    /// Read session details.
    ReadSession,
    /// Edit session details.
    UpdateSession,
    /// Delete sessions.
    DeleteSession,
    /// Record session attendance.
    ManageSessionAttendance,

    // Goal
    /// Create goals.
    CreateGoal,
    /// Read goals.
    ReadGoal,
    /// Edit goals.
    UpdateGoal,
    /// Delete goals.
    DeleteGoal,
    /// Update goal milestones and progress.
    ManageGoalProgress,

    // Communication
    /// Send direct messages.
    SendMessage,
    /// Read direct messages.
    ReadMessage,
    /// Delete messages.
    DeleteMessage,
    /// Broadcast announcements.
    SendAnnouncement,
    /// Configure notification delivery.
    ManageNotifications,

    // Reports & analytics
    /// View standard reports.
    ViewReports,
    /// Export report data.
    ExportReports,
    /// View platform analytics.
    ViewAnalytics,
    /// View per-program analytics.
    ViewProgramAnalytics,

    // System administration
    /// Change platform settings.
    ManageSystemSettings,
    /// Read the audit trail.
    ViewAuditLogs,
    /// Configure third-party integrations.
    ManageIntegrations,
    /// Trigger and restore backups.
    ManageBackups,

    // Matching
    /// Create mentor/mentee matches.
    CreateMatch,
    /// Read matches.
    ReadMatch,
    /// Edit matches.
    UpdateMatch,
    /// Dissolve matches.
    DeleteMatch,
    /// Ask to be matched with a mentor.
    RequestMentor,

    // Feedback & gamification
    /// Submit feedback.
    SubmitFeedback,
    /// Read feedback.
    ReadFeedback,
    /// Triage and remove feedback.
    ManageFeedback,
    /// Award badges.
    AwardBadges,
    /// View leaderboards.
    ViewLeaderboard,
    /// Configure badges, points, and leaderboards.
    ManageGamification,

    // Enhanced workflow actions
    /// Moderate user-generated content.
    ModerateContent,
    /// Suspend a user account.
    SuspendUser,
    /// Lift a suspension.
    ReactivateUser,
    /// Import users in bulk.
    BulkImportUsers,
    /// Assign mentors in bulk.
    BulkAssignMentors,
    /// Book a session slot.
    BookSession,
    /// Confirm a booked session.
    ConfirmSession,
    /// Cancel a booked session.
    CancelSession,
    /// Accept a mentorship request.
    ApproveMentorshipRequest,
    /// Decline a mentorship request.
    RejectMentorshipRequest,
    /// Follow mentee progress across goals and sessions.
    TrackMenteeProgress,
    /// View one's own progress dashboard.
    ViewOwnProgress,
}

/// Resource domain a permission belongs to. Documentation grouping only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PermissionDomain {
    /// User accounts.
    User,
    /// Mentorship programs.
    Program,
    /// Sessions.
    Session,
    /// Goals.
    Goal,
    /// Messages, announcements, notifications.
    Communication,
    /// Reports and analytics.
    Reports,
    /// Platform administration.
    System,
    /// Mentor/mentee matching.
    Matching,
    /// Feedback and gamification.
    Feedback,
    /// Moderation, suspension, bulk and workflow actions.
    Enhanced,
}

impl Permission {
    /// Canonical snake_case identifier.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Domain used to group the permission in listings.
    pub fn domain(self) -> PermissionDomain {
        use Permission::*;
        match self {
            CreateUser | ReadUser | UpdateUser | DeleteUser | ListUsers | ManageUserRoles => {
                PermissionDomain::User
            }
            CreateProgram | ReadProgram | UpdateProgram | DeleteProgram | PublishProgram
            | ManageProgramEnrollment => PermissionDomain::Program,
            CreateSession | ReadSession | UpdateSession | DeleteSession
            | ManageSessionAttendance => PermissionDomain::Session,
            CreateGoal | ReadGoal | UpdateGoal | DeleteGoal | ManageGoalProgress => {
                PermissionDomain::Goal
            }
            SendMessage | ReadMessage | DeleteMessage | SendAnnouncement
            | ManageNotifications => PermissionDomain::Communication,
            ViewReports | ExportReports | ViewAnalytics | ViewProgramAnalytics => {
                PermissionDomain::Reports
            }
            ManageSystemSettings | ViewAuditLogs | ManageIntegrations | ManageBackups => {
                PermissionDomain::System
            }
            CreateMatch | ReadMatch | UpdateMatch | DeleteMatch | RequestMentor => {
                PermissionDomain::Matching
            }
            SubmitFeedback | ReadFeedback | ManageFeedback | AwardBadges | ViewLeaderboard
            | ManageGamification => PermissionDomain::Feedback,
            ModerateContent | SuspendUser | ReactivateUser | BulkImportUsers
            | BulkAssignMentors | BookSession | ConfirmSession | CancelSession
            | ApproveMentorshipRequest | RejectMentorshipRequest | TrackMenteeProgress
            | ViewOwnProgress => PermissionDomain::Enhanced,
        }
    }
}
