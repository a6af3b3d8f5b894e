//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Access-control counters exported via Prometheus.
#[derive(Clone)]
pub struct AccessMetrics {
    registry: Arc<Registry>,
    allowed_total: IntCounter,
    denied_total: IntCounterVec,
    unknown_role_total: IntCounter,
    assignments_rejected_total: IntCounter,
}

impl AccessMetrics {
    /// Register metrics with the provided registry.
    pub fn new(registry: Arc<Registry>) -> anyhow::Result<Self> {
        let allowed_total = IntCounter::new(
            "access_decisions_allowed_total",
            "Access decisions that let the subject through",
        )?;
        let denied_total = IntCounterVec::new(
            Opts::new(
                "access_decisions_denied_total",
                "Access decisions that rejected the subject, by reason",
            ),
            &["reason"],
        )?;
        let unknown_role_total = IntCounter::new(
            "access_unknown_role_total",
            "Subjects presenting a role claim outside the registry",
        )?;
        let assignments_rejected_total = IntCounter::new(
            "role_assignments_rejected_total",
            "Role assignment attempts refused by policy",
        )?;

        registry.register(Box::new(allowed_total.clone()))?;
        registry.register(Box::new(denied_total.clone()))?;
        registry.register(Box::new(unknown_role_total.clone()))?;
        registry.register(Box::new(assignments_rejected_total.clone()))?;

        Ok(Self {
            registry,
            allowed_total,
            denied_total,
            unknown_role_total,
            assignments_rejected_total,
        })
    }

    /// Access the underlying registry.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Count an allowed decision.
    pub fn inc_allowed(&self) {
        self.allowed_total.inc();
    }

    /// Count a denied decision under `reason`.
    pub fn inc_denied(&self, reason: &str) {
        self.denied_total.with_label_values(&[reason]).inc();
    }

    /// Count a subject with an unrecognised role claim.
    pub fn inc_unknown_role(&self) {
        self.unknown_role_total.inc();
    }

    /// Count a refused role assignment.
    pub fn inc_assignment_rejected(&self) {
        self.assignments_rejected_total.inc();
    }
}
