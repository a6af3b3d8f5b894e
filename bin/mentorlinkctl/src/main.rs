//! ---
//! ml_section: "05-operator-tooling"
//! ml_subsection: "binary"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Control CLI for operators auditing MentorLink access control."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mentorlink_common::{init_tracing, AppConfig};
use mentorlink_logging as logging;
use mentorlink_rbac::{AccessPolicy, AuthorizationService};

mod audit;
mod inspect;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "MentorLink access-control inspection utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (falls back to `configs/mentorlink.toml`, then defaults).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,
    /// Write logs to the configured rolling log directory.
    #[arg(long, global = true)]
    file_logs: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(flatten)]
    Inspect(inspect::InspectCommand),
    #[command(subcommand, about = "Role assignment audit trail actions")]
    Audit(audit::AuditCommand),
}

/// Shared state handed to every subcommand.
pub struct Context {
    pub config: AppConfig,
    pub service: AuthorizationService,
    pub json: bool,
}

fn load_config(explicit: Option<&PathBuf>) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::from_path(path),
        None => AppConfig::load_or_default(&[PathBuf::from("configs/mentorlink.toml")]),
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    if cli.file_logs {
        init_tracing("mentorlinkctl", &config.logging)?;
    } else {
        logging::init();
    }

    let service = AuthorizationService::builtin(AccessPolicy::from(&config.access));
    let ctx = Context {
        config,
        service,
        json: cli.json,
    };
    match cli.command {
        Commands::Inspect(cmd) => inspect::run(&ctx, cmd),
        Commands::Audit(cmd) => audit::run(&ctx, cmd),
    }
}
