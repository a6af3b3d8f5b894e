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

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use mentorlink_rbac::{AccessGuard, AuditLog, Role, RoleAssignmentRequest, Subject};

use crate::Context;

/// Role assignment audit trail commands.
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Validate a role assignment and record the outcome.
    Assign(AssignArgs),
    /// Print every recorded entry.
    Show(LogArgs),
    /// Verify the hash chain; exits non-zero on tampering.
    Verify(LogArgs),
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Audit log path; overrides `[audit] path` from the configuration.
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AssignArgs {
    #[command(flatten)]
    pub log: LogArgs,
    /// User performing the assignment.
    #[arg(long)]
    pub assigner_id: String,
    /// Role claim of the assigner.
    #[arg(long)]
    pub assigner_role: String,
    /// User receiving the role.
    #[arg(long)]
    pub target_user: String,
    /// Role to hand out.
    #[arg(long)]
    pub target_role: Role,
}

fn open_log(ctx: &Context, args: &LogArgs) -> Result<AuditLog> {
    let path = args
        .path
        .clone()
        .or_else(|| ctx.config.audit.path.clone())
        .ok_or_else(|| anyhow!("no audit log configured; pass --path or set [audit] path"))?;
    AuditLog::new(path)
}

/// Execute an audit command.
pub fn run(ctx: &Context, command: AuditCommand) -> Result<ExitCode> {
    match command {
        AuditCommand::Assign(args) => {
            let mut log = open_log(ctx, &args.log)?;
            let request = RoleAssignmentRequest {
                assigner: Subject::new(args.assigner_id, args.assigner_role),
                target_user_id: args.target_user,
                target_role: args.target_role,
            };
            let outcome = AccessGuard::new(ctx.service.clone()).authorize_assignment(&request);
            let entry = log.record_assignment(&request, &outcome)?;
            match outcome {
                Ok(assignment) => {
                    println!(
                        "assigned {} to {} (entry {})",
                        assignment.role,
                        assignment.user_id,
                        &entry.hash[..12]
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    println!("refused: {err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        AuditCommand::Show(args) => {
            let log = open_log(ctx, &args)?;
            for entry in log.entries()? {
                if ctx.json {
                    println!("{}", serde_json::to_string(&entry)?);
                } else {
                    println!(
                        "{} {:<26} {:<12} {}",
                        entry.timestamp.to_rfc3339(),
                        entry.action,
                        entry.actor,
                        entry.metadata
                    );
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        AuditCommand::Verify(args) => {
            let log = open_log(ctx, &args)?;
            if log.verify()? {
                println!("audit log intact: {}", log.path().display());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("audit log tampered: {}", log.path().display());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
