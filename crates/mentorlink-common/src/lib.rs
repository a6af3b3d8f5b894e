//! ---
//! ml_section: "01-core-functionality"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Shared configuration and tracing bootstrap."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
//! Shared primitives for the MentorLink workspace: configuration loading and
//! the tracing bootstrap used by binaries.

pub mod config;
pub mod logging;

pub use config::{AccessConfig, AppConfig, AuditConfig, LoggingConfig, UnguardedPolicy};
pub use logging::{filter_directive, init_tracing, log_file_name, LogFormat};
