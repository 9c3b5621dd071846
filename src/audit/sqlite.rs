//! SQLite storage for audit events.
//!
//! One `events` table per vault directory, shared by every vault in it.
//! The schema is versioned through `PRAGMA user_version`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, Row};

use super::{AuditEvent, Operation, Outcome};
use crate::errors::{Result, SaltVaultError};

const DB_FILE: &str = "audit.db";
const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    at_ms            INTEGER NOT NULL,
    vault            TEXT    NOT NULL,
    operation        TEXT    NOT NULL,
    outcome          TEXT    NOT NULL,
    entry_name       TEXT,
    entry_kind       TEXT,
    iterations       INTEGER,
    salt_fp          TEXT,
    prev_iterations  INTEGER,
    prev_salt_fp     TEXT
);
CREATE INDEX IF NOT EXISTS events_by_vault ON events (vault, at_ms);
";

/// A stored event.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub vault: String,
    pub event: AuditEvent,
}

/// Selects records for `AuditLog::query`.  Unset fields match anything;
/// results are newest first, at most `limit` of them.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub limit: usize,
    pub since: Option<DateTime<Utc>>,
    pub vault: Option<String>,
    pub operation: Option<Operation>,
    pub entry_name: Option<String>,
}

pub struct AuditLog {
    conn: Connection,
    path: PathBuf,
}

impl AuditLog {
    /// Open `<vault_dir>/audit.db`, creating it and its schema on first use.
    pub fn open(vault_dir: &Path) -> Result<Self> {
        let path = vault_dir.join(DB_FILE);
        let conn = Connection::open(&path).map_err(db_err("open"))?;
        restrict_permissions(&path);

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(db_err("read schema version"))?;

        match version {
            0 => {
                conn.execute_batch(SCHEMA).map_err(db_err("create schema"))?;
                conn.pragma_update(None, "user_version", SCHEMA_VERSION)
                    .map_err(db_err("write schema version"))?;
            }
            SCHEMA_VERSION => {}
            other => {
                return Err(SaltVaultError::AuditError(format!(
                    "{} has schema version {other}, expected {SCHEMA_VERSION}",
                    path.display()
                )))
            }
        }

        Ok(Self { conn, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store `event` for `vault`, stamped with the current time.
    /// Returns the new record id.
    pub fn record(&self, vault: &str, event: &AuditEvent) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO events (at_ms, vault, operation, outcome, entry_name, entry_kind,
                                     iterations, salt_fp, prev_iterations, prev_salt_fp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    Utc::now().timestamp_millis(),
                    vault,
                    event.operation,
                    event.outcome,
                    event.entry_name,
                    event.entry_kind,
                    event.iterations,
                    event.salt_fingerprint,
                    event.previous_iterations,
                    event.previous_salt_fingerprint,
                ],
            )
            .map_err(db_err("insert"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn query(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>> {
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let since_ms = filter.since.map(|t| t.timestamp_millis());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, at_ms, vault, operation, outcome, entry_name, entry_kind,
                        iterations, salt_fp, prev_iterations, prev_salt_fp
                 FROM events
                 WHERE (?1 IS NULL OR at_ms >= ?1)
                   AND (?2 IS NULL OR vault = ?2)
                   AND (?3 IS NULL OR operation = ?3)
                   AND (?4 IS NULL OR entry_name = ?4)
                 ORDER BY id DESC
                 LIMIT ?5",
            )
            .map_err(db_err("prepare query"))?;

        let rows = stmt
            .query_map(
                params![
                    since_ms,
                    filter.vault,
                    filter.operation,
                    filter.entry_name,
                    limit
                ],
                read_record,
            )
            .map_err(db_err("run query"))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err("read row"))
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<AuditRecord> {
    let at_ms: i64 = row.get(1)?;
    let timestamp = DateTime::from_timestamp_millis(at_ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(1, at_ms))?;

    Ok(AuditRecord {
        id: row.get(0)?,
        timestamp,
        vault: row.get(2)?,
        event: AuditEvent {
            operation: row.get(3)?,
            outcome: row.get(4)?,
            entry_name: row.get(5)?,
            entry_kind: row.get(6)?,
            iterations: row.get(7)?,
            salt_fingerprint: row.get(8)?,
            previous_iterations: row.get(9)?,
            previous_salt_fingerprint: row.get(10)?,
        },
    })
}

fn db_err(context: &'static str) -> impl Fn(rusqlite::Error) -> SaltVaultError {
    move |e| SaltVaultError::AuditError(format!("{context}: {e}"))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

// Operations and outcomes are stored by name.

impl ToSql for Operation {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Operation {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for Outcome {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Outcome {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}
