//! Audit log: a history of what was done to the vaults in a directory.
//!
//! Commands describe what happened as a typed `AuditEvent`.  With the
//! `audit-log` feature (on by default) events are stored in SQLite at
//! `<vault_dir>/audit.db`; without it `log_audit` does nothing.
//!
//! Salts are never written to the log.  Rotations are traced through a
//! short SHA-512 fingerprint of the old and new salt instead.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha512};

use crate::cli::Context;

#[cfg(feature = "audit-log")]
mod sqlite;

#[cfg(feature = "audit-log")]
pub use sqlite::{AuditFilter, AuditLog, AuditRecord};

/// Bytes of the SHA-512 digest kept in a salt fingerprint.
const FINGERPRINT_LEN: usize = 8;

/// Vault operations that are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Set,
    Delete,
    RotateKey,
    Verify,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Init,
        Operation::Set,
        Operation::Delete,
        Operation::RotateKey,
        Operation::Verify,
    ];

    /// Name as stored in the database and typed on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::RotateKey => "rotate-key",
            Operation::Verify => "verify",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                format!("unknown operation '{s}' (expected init, set, delete, rotate-key or verify)")
            })
    }
}

/// How a recorded operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
    /// `set` created a new entry.
    Added,
    /// `set` replaced an existing entry.
    Updated,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Ok => "ok",
            Outcome::Failed => "failed",
            Outcome::Added => "added",
            Outcome::Updated => "updated",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Outcome::Ok),
            "failed" => Ok(Outcome::Failed),
            "added" => Ok(Outcome::Added),
            "updated" => Ok(Outcome::Updated),
            other => Err(format!("unknown outcome '{other}'")),
        }
    }
}

/// Hex of the first 8 bytes of `SHA-512(salt)`.
pub fn salt_fingerprint(salt: &[u8]) -> String {
    let digest = Sha512::digest(salt);
    hex::encode(&digest[..FINGERPRINT_LEN])
}

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub operation: Operation,
    pub outcome: Outcome,
    pub entry_name: Option<String>,
    pub entry_kind: Option<String>,
    /// PBKDF2 iterations of the vault after the operation.
    pub iterations: Option<u32>,
    pub salt_fingerprint: Option<String>,
    /// Key parameters before a `rotate-key`.
    pub previous_iterations: Option<u32>,
    pub previous_salt_fingerprint: Option<String>,
}

impl AuditEvent {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            outcome: Outcome::Ok,
            entry_name: None,
            entry_kind: None,
            iterations: None,
            salt_fingerprint: None,
            previous_iterations: None,
            previous_salt_fingerprint: None,
        }
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = outcome;
        self
    }

    pub fn entry(mut self, name: &str, kind: &str) -> Self {
        self.entry_name = Some(name.to_string());
        self.entry_kind = Some(kind.to_string());
        self
    }

    pub fn key_params(mut self, iterations: u32, salt: &[u8]) -> Self {
        self.iterations = Some(iterations);
        self.salt_fingerprint = Some(salt_fingerprint(salt));
        self
    }

    pub fn previous_key_params(mut self, iterations: u32, salt: &[u8]) -> Self {
        self.previous_iterations = Some(iterations);
        self.previous_salt_fingerprint = Some(salt_fingerprint(salt));
        self
    }

    /// One-line summary of the typed columns, for tables.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        if let Some(kind) = &self.entry_kind {
            parts.push(format!("kind {kind}"));
        }

        let fp = |f: &Option<String>| f.clone().unwrap_or_else(|| "?".into());
        match (self.previous_iterations, self.iterations) {
            (Some(old), Some(new)) => {
                parts.push(format!("iterations {old} -> {new}"));
                parts.push(format!(
                    "salt {} -> {}",
                    fp(&self.previous_salt_fingerprint),
                    fp(&self.salt_fingerprint)
                ));
            }
            (None, Some(new)) => {
                parts.push(format!("iterations {new}"));
                parts.push(format!("salt {}", fp(&self.salt_fingerprint)));
            }
            _ => {}
        }

        if parts.is_empty() {
            "-".into()
        } else {
            parts.join(", ")
        }
    }
}

/// Record `event` for the context's vault.
///
/// Failures to open or write the database are dropped: the log is a
/// convenience and never fails the calling command.
#[cfg(feature = "audit-log")]
pub fn log_audit(ctx: &Context, event: &AuditEvent) {
    if let Ok(log) = AuditLog::open(&ctx.vault_dir) {
        let _ = log.record(&ctx.vault_name, event);
    }
}

#[cfg(not(feature = "audit-log"))]
pub fn log_audit(_ctx: &Context, _event: &AuditEvent) {}
