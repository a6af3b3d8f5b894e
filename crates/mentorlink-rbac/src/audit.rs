//! ---
//! ml_section: "02-access-control"
//! ml_subsection: "module"
//! ml_type: "source"
//! ml_scope: "code"
//! ml_description: "Role registry, permission registry, and authorization decisions."
//! ml_version: "v0.0.0-prealpha"
//! ml_owner: "tbd"
//! ---
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::assignment::{AssignmentError, RoleAssignment, RoleAssignmentRequest};

/// Action recorded for an accepted role assignment.
pub const ACTION_ROLE_ASSIGNED: &str = "role.assigned";
/// Action recorded for a refused role assignment.
pub const ACTION_ROLE_ASSIGNMENT_REJECTED: &str = "role.assignment_rejected";

const GENESIS_HASH_LEN: usize = 64;

/// Entry recorded in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// User responsible for the event.
    pub actor: String,
    /// Event type, e.g. [`ACTION_ROLE_ASSIGNED`].
    pub action: String,
    /// Event details.
    pub metadata: serde_json::Value,
    /// SHA-256 over the entry contents and the previous hash.
    pub hash: String,
    /// Hash of the previous entry, or zeros for the first one.
    pub previous_hash: String,
}

impl AuditEntry {
    fn compute_hash(
        timestamp: DateTime<Utc>,
        actor: &str,
        action: &str,
        metadata: &serde_json::Value,
        previous_hash: &str,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(
            timestamp
                .timestamp_nanos_opt()
                .unwrap_or_default()
                .to_be_bytes(),
        );
        hasher.update(actor.as_bytes());
        hasher.update(action.as_bytes());
        hasher.update(metadata.to_string().as_bytes());
        hasher.update(previous_hash.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Hash-chained audit trail stored as newline-delimited JSON.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    last_hash: String,
}

impl AuditLog {
    /// Open (or lazily create) the log at `path`, resuming from its head hash.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut log = Self {
            path: path.clone(),
            last_hash: "0".repeat(GENESIS_HASH_LEN),
        };
        for entry in log.entries()? {
            log.last_hash = entry.hash;
        }
        Ok(log)
    }

    /// Path backing this log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new entry.
    pub fn append(
        &mut self,
        actor: &str,
        action: &str,
        metadata: serde_json::Value,
    ) -> Result<AuditEntry> {
        let timestamp = Utc::now();
        let hash = AuditEntry::compute_hash(timestamp, actor, action, &metadata, &self.last_hash);
        let entry = AuditEntry {
            timestamp,
            actor: actor.to_string(),
            action: action.to_string(),
            metadata,
            hash: hash.clone(),
            previous_hash: self.last_hash.clone(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("unable to create audit directory {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("unable to open audit log {}", self.path.display()))?;
        file.write_all(serde_json::to_string(&entry)?.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        self.last_hash = hash;
        Ok(entry)
    }

    /// Record the outcome of a role assignment request.
    pub fn record_assignment(
        &mut self,
        request: &RoleAssignmentRequest,
        outcome: &Result<RoleAssignment, AssignmentError>,
    ) -> Result<AuditEntry> {
        let actor = request.assigner.user_id.as_str();
        match outcome {
            Ok(assignment) => self.append(
                actor,
                ACTION_ROLE_ASSIGNED,
                json!({
                    "target_user_id": assignment.user_id,
                    "role": assignment.role,
                    "assigner_role": assignment.assigner_role,
                    "assigned_at": assignment.assigned_at.to_rfc3339(),
                }),
            ),
            Err(err) => self.append(
                actor,
                ACTION_ROLE_ASSIGNMENT_REJECTED,
                json!({
                    "target_user_id": request.target_user_id,
                    "role": request.target_role,
                    "assigner_role": request.assigner.role,
                    "reason": err.to_string(),
                }),
            ),
        }
    }

    /// All entries currently on disk, oldest first.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for line in BufReader::new(fs::File::open(&self.path)?).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry = serde_json::from_str(&line).with_context(|| {
                format!("malformed audit entry in {}", self.path.display())
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Verify the hash chain; `false` means the file was edited.
    pub fn verify(&self) -> Result<bool> {
        let mut previous = "0".repeat(GENESIS_HASH_LEN);
        for entry in self.entries()? {
            let expected = AuditEntry::compute_hash(
                entry.timestamp,
                &entry.actor,
                &entry.action,
                &entry.metadata,
                &previous,
            );
            if expected != entry.hash || entry.previous_hash != previous {
                return Ok(false);
            }
            previous = entry.hash;
        }
        Ok(true)
    }
}
