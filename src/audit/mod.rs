//! Audit log — SQLite-based operation history.
//!
//! Stores a record of every credential operation (encrypt, decrypt,
//! token set/get/clear) in a local SQLite database at
//! `<data_dir>/audit.db`.  Values and ciphertexts are never recorded.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{CredVaultError, Result};

/// Outcome recorded for a successful operation.
pub const OUTCOME_OK: &str = "ok";

/// Outcome recorded when the cipher itself failed.
pub const OUTCOME_CRYPTO_FAILURE: &str = "crypto-failure";

/// Outcome recorded for any other failure.
pub const OUTCOME_ERROR: &str = "error";

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub user_id: Option<String>,
    pub token_kind: Option<String>,
    pub outcome: String,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database at `<data_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened — callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(data_dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(data_dir);
        let conn = Connection::open(&db_path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                user_id     TEXT,
                token_kind  TEXT,
                outcome     TEXT NOT NULL
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation.  Write errors are ignored.
    pub fn log(
        &self,
        operation: &str,
        user_id: Option<&str>,
        token_kind: Option<&str>,
        outcome: &str,
    ) {
        let now = Utc::now().to_rfc3339();
        let _ = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, user_id, token_kind, outcome)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, user_id, token_kind, outcome],
        );
    }

    /// Most recent entries first, at most `limit`, optionally only those
    /// at or after `since`.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, user_id, token_kind, outcome
                 FROM audit_log
                 WHERE ?1 IS NULL OR timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| CredVaultError::AuditError(format!("query prepare: {e}")))?;

        let since = since.map(|ts| ts.to_rfc3339());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let entries = stmt
            .query_map(rusqlite::params![since, limit], row_to_entry)
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| CredVaultError::AuditError(format!("query: {e}")))?;

        Ok(entries)
    }

    /// Return the path to the audit database.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("audit.db")
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEntry> {
    let ts: String = row.get(1)?;
    // Unparseable timestamps show as "now".
    let timestamp = DateTime::parse_from_rfc3339(&ts)
        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

    Ok(AuditEntry {
        id: row.get(0)?,
        timestamp,
        operation: row.get(2)?,
        user_id: row.get(3)?,
        token_kind: row.get(4)?,
        outcome: row.get(5)?,
    })
}

/// Map an operation result to the outcome string stored in the log.
pub fn outcome_of<T>(result: &Result<T>) -> &'static str {
    match result {
        Ok(_) => OUTCOME_OK,
        Err(e) if e.is_crypto_failure() => OUTCOME_CRYPTO_FAILURE,
        Err(_) => OUTCOME_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DecryptFailure;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path());
        assert!(audit.is_some(), "should open successfully");
        assert!(dir.path().join("audit.db").exists());
    }

    #[test]
    fn log_and_query_roundtrip() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("token-set", Some("u1"), Some("deploy"), OUTCOME_OK);
        audit.log("token-get", Some("u1"), Some("deploy"), OUTCOME_CRYPTO_FAILURE);
        audit.log("encrypt", None, None, OUTCOME_OK);

        let entries = audit.query(10, None).unwrap();
        assert_eq!(entries.len(), 3);

        // Most recent first.
        assert_eq!(entries[0].operation, "encrypt");
        assert!(entries[0].user_id.is_none());
        assert_eq!(entries[1].outcome, OUTCOME_CRYPTO_FAILURE);
        assert_eq!(entries[2].token_kind.as_deref(), Some("deploy"));
    }

    #[test]
    fn query_with_limit() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        for i in 0..10 {
            audit.log("token-set", Some(&format!("user-{i}")), Some("deploy"), OUTCOME_OK);
        }

        assert_eq!(audit.query(3, None).unwrap().len(), 3);
    }

    #[test]
    fn query_with_since_filter() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.log("hash", None, None, OUTCOME_OK);

        let past = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(audit.query(10, Some(past)).unwrap().len(), 1);

        let future = Utc::now() + chrono::Duration::hours(1);
        assert!(audit.query(10, Some(future)).unwrap().is_empty());
    }

    #[test]
    fn open_returns_none_on_bad_path() {
        let result = AuditLog::open(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(result.is_none());
    }

    #[test]
    fn outcome_distinguishes_crypto_failures() {
        let ok: Result<()> = Ok(());
        let crypto: Result<()> = Err(CredVaultError::DecryptionFailure(
            DecryptFailure::Authentication,
        ));
        let other: Result<()> = Err(CredVaultError::ProfileNotFound("u".into()));

        assert_eq!(outcome_of(&ok), OUTCOME_OK);
        assert_eq!(outcome_of(&crypto), OUTCOME_CRYPTO_FAILURE);
        assert_eq!(outcome_of(&other), OUTCOME_ERROR);
    }

    #[cfg(unix)]
    #[test]
    fn audit_db_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _audit = AuditLog::open(dir.path()).unwrap();

        let perms = std::fs::metadata(dir.path().join("audit.db"))
            .unwrap()
            .permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
