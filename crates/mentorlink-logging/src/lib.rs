//! ---
//! ml_section: "03-logging"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Structured logging adapters for access-control events."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Structured logging helpers shared by the access-control crates.

use tracing::Level;
use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

pub mod macros;

/// Initialize a baseline tracing subscriber suitable for development and tests.
pub fn init() {
    let _ = Registry::default()
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(subscriber_fmt::layer())
        .try_init();
}

/// Request context attached to log events by the convenience macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogContext<'a> {
    /// Authenticated user identifier, when known.
    pub user_id: Option<&'a str>,
    /// Role claim carried by the subject, verbatim.
    pub role: Option<&'a str>,
    /// Route or operation being authorised.
    pub route: Option<&'a str>,
    /// Upstream request correlation id.
    pub request_id: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a user identifier.
    pub fn with_user(mut self, user_id: &'a str) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Attach the subject's role claim.
    pub fn with_role(mut self, role: &'a str) -> Self {
        self.role = Some(role);
        self
    }

    /// Attach a route or operation name.
    pub fn with_route(mut self, route: &'a str) -> Self {
        self.route = Some(route);
        self
    }

    /// Attach a request correlation id.
    pub fn with_request_id(mut self, request_id: &'a str) -> Self {
        self.request_id = Some(request_id);
        self
    }
}

/// Outcome of an access-control decision, as logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The subject was let through.
    Allowed,
    /// The subject was rejected.
    Denied,
}

impl AccessOutcome {
    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Allowed => "allowed",
            AccessOutcome::Denied => "denied",
        }
    }
}

/// Emit a standardized access event. Allowed decisions log at debug, denials at warn.
pub fn log_access_event(
    context: Option<&LogContext>,
    event: &str,
    reason: &str,
    outcome: AccessOutcome,
) {
    let ctx = context.copied().unwrap_or_default();
    match outcome {
        AccessOutcome::Allowed => tracing::event!(
            Level::DEBUG,
            event,
            outcome = outcome.as_str(),
            reason,
            user_id = ctx.user_id.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            route = ctx.route.unwrap_or(""),
            request_id = ctx.request_id.unwrap_or(""),
            "access decision"
        ),
        AccessOutcome::Denied => tracing::event!(
            Level::WARN,
            event,
            outcome = outcome.as_str(),
            reason,
            user_id = ctx.user_id.unwrap_or(""),
            role = ctx.role.unwrap_or(""),
            route = ctx.route.unwrap_or(""),
            request_id = ctx.request_id.unwrap_or(""),
            "access decision"
        ),
    }
}
