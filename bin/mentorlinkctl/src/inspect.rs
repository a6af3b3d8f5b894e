//! ---
//! ml_section: "05-operator-tooling"
//! ml_subsection: "binary"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Control CLI for operators auditing MentorLink access control."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;
use mentorlink_rbac::{Permission, Role};
use serde_json::json;
use strum::IntoEnumIterator;

use crate::Context;

/// Read-only questions about the role and permission tables.
#[derive(Debug, Subcommand)]
pub enum InspectCommand {
    /// List roles with their hierarchy rank.
    Roles,
    /// List the permissions held by a role claim.
    Permissions {
        /// Role claim, e.g. `mentor`.
        #[arg(long)]
        role: String,
    },
    /// Check one permission; exits non-zero when denied.
    Check {
        /// Role claim.
        #[arg(long)]
        role: String,
        /// Permission identifier, e.g. `read_program`.
        #[arg(long)]
        permission: Permission,
    },
    /// List the roles a role claim may assign.
    Assignable {
        /// Role claim.
        #[arg(long)]
        role: String,
    },
    /// Check one role assignment; exits non-zero when refused.
    CanAssign {
        /// Role claim of the assigner.
        #[arg(long)]
        assigner: String,
        /// Role to hand out.
        #[arg(long)]
        target: Role,
    },
    /// Print the full role × permission matrix.
    Matrix,
    /// Print the UI capability view for a role claim.
    Capabilities {
        /// Role claim.
        #[arg(long)]
        role: String,
    },
}

/// Execute an inspection command.
pub fn run(ctx: &Context, command: InspectCommand) -> Result<ExitCode> {
    let svc = &ctx.service;
    match command {
        InspectCommand::Roles => {
            if ctx.json {
                let roles: Vec<_> = Role::iter()
                    .map(|role| json!({"role": role, "rank": role.rank()}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&roles)?);
            } else {
                for role in Role::iter() {
                    println!("{:<12} {:>3}", role.as_str(), role.rank());
                }
            }
        }
        InspectCommand::Permissions { role } => {
            let claim = svc.resolve(&role);
            let held: Vec<Permission> = svc.permissions(claim).iter().copied().collect();
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&held)?);
            } else {
                if !claim.is_known() {
                    eprintln!("unknown role `{role}`: holds no permissions");
                }
                for permission in held {
                    println!("{:<14} {}", permission.domain().as_ref(), permission.as_str());
                }
            }
        }
        InspectCommand::Check { role, permission } => {
            let allowed = svc.has_permission(svc.resolve(&role), permission);
            report(ctx, allowed, json!({"role": role, "permission": permission}))?;
            return Ok(exit_for(allowed));
        }
        InspectCommand::Assignable { role } => {
            let roles = svc.assignable_roles(svc.resolve(&role));
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&roles)?);
            } else {
                for role in roles {
                    println!("{}", role.as_str());
                }
            }
        }
        InspectCommand::CanAssign { assigner, target } => {
            let allowed = svc.can_assign_role(svc.resolve(&assigner), target);
            report(ctx, allowed, json!({"assigner": assigner, "target": target}))?;
            return Ok(exit_for(allowed));
        }
        InspectCommand::Matrix => print_matrix(ctx)?,
        InspectCommand::Capabilities { role } => {
            let caps = svc.capabilities(svc.resolve(&role));
            println!("{}", serde_json::to_string_pretty(&caps)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn report(ctx: &Context, allowed: bool, mut details: serde_json::Value) -> Result<()> {
    if ctx.json {
        details["allowed"] = json!(allowed);
        println!("{}", serde_json::to_string(&details)?);
    } else {
        println!("{}", if allowed { "allowed" } else { "denied" });
    }
    Ok(())
}

fn exit_for(allowed: bool) -> ExitCode {
    if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_matrix(ctx: &Context) -> Result<()> {
    let table = ctx.service.table();
    if ctx.json {
        let matrix: serde_json::Map<String, serde_json::Value> = table
            .iter()
            .map(|(role, held)| (role.as_str().to_owned(), json!(held)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&matrix)?);
        return Ok(());
    }

    let header: Vec<String> = Role::iter().map(|r| format!("{:>4}", abbreviate(r))).collect();
    println!("{:<28}{}", "permission", header.join(""));
    for permission in Permission::iter() {
        let cells: String = Role::iter()
            .map(|role| {
                let mark = if table.permissions_of(role).contains(&permission) {
                    "x"
                } else {
                    "."
                };
                format!("{mark:>4}")
            })
            .collect();
        println!("{:<28}{}", permission.as_str(), cells);
    }
    Ok(())
}

fn abbreviate(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "SA",
        Role::Admin => "ADM",
        Role::Coordinator => "CRD",
        Role::Faculty => "FAC",
        Role::Mentor => "MTR",
        Role::Mentee => "MTE",
        Role::Student => "STU",
    }
}
