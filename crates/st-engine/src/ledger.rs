//! Version ledger: the durable record of applied migrations.
//!
//! Lives inside the target datastore itself, under the `st_meta`
//! schema, so a committed migration step and its ledger row are a
//! single atomic unit. The table is created by the engine on first
//! use and is never part of a user migration.

use crate::error::{EngineError, EngineResult};
use duckdb::{params, Connection};
use serde::Serialize;

/// Schema holding engine-owned tables inside the target datastore
pub const LEDGER_SCHEMA: &str = "st_meta";

/// Fully-qualified name of the ledger table
pub const LEDGER_TABLE: &str = "st_meta.schema_migrations";

/// One applied migration, as recorded in the ledger.
///
/// Once written, `checksum` is immutable truth for its version: any
/// later mismatch against the on-disk script is drift and is never
/// silently repaired.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Surrogate key
    pub id: i64,

    /// Migration version (unique)
    pub version: u64,

    /// Migration name as recorded at apply time
    pub name: String,

    /// SHA-256 hex digest of the script's byte content at apply time
    pub checksum: String,

    /// Timestamp written by the datastore inside the apply transaction
    pub applied_at: String,

    /// Wall-clock duration of the script's execution
    pub execution_time_ms: u64,
}

/// Idempotently create the ledger schema, sequence, and table.
///
/// Safe to call on every startup.
pub fn ensure_schema(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(
        "CREATE SCHEMA IF NOT EXISTS st_meta;
         CREATE SEQUENCE IF NOT EXISTS st_meta.schema_migrations_id_seq;
         CREATE TABLE IF NOT EXISTS st_meta.schema_migrations (
             id                BIGINT PRIMARY KEY DEFAULT nextval('st_meta.schema_migrations_id_seq'),
             version           BIGINT NOT NULL UNIQUE,
             name              VARCHAR NOT NULL,
             checksum          VARCHAR NOT NULL,
             applied_at        TIMESTAMP NOT NULL DEFAULT now(),
             execution_time_ms BIGINT NOT NULL
         );",
    )
    .map_err(|e| EngineError::Ledger(format!("failed to create {LEDGER_TABLE}: {e}")))?;
    Ok(())
}

/// Check whether the ledger table exists without creating it.
///
/// Lets read-only commands (`status`, `validate`) report an empty
/// ledger on a fresh datastore without mutating it.
pub fn table_exists(conn: &Connection) -> EngineResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = 'st_meta' AND table_name = 'schema_migrations'",
            [],
            |row| row.get(0),
        )
        .map_err(|e| EngineError::Ledger(format!("failed to probe ledger table: {e}")))?;
    Ok(count > 0)
}

/// All applied migrations, ascending by version.
pub fn list_applied(conn: &Connection) -> EngineResult<Vec<LedgerEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, version, name, checksum, CAST(applied_at AS VARCHAR), execution_time_ms \
             FROM st_meta.schema_migrations ORDER BY version ASC",
        )
        .map_err(|e| EngineError::Ledger(format!("failed to read ledger: {e}")))?;

    let entries = stmt
        .query_map([], |row| {
            Ok(LedgerEntry {
                id: row.get(0)?,
                version: row.get::<_, i64>(1)? as u64,
                name: row.get(2)?,
                checksum: row.get(3)?,
                applied_at: row.get(4)?,
                execution_time_ms: row.get::<_, i64>(5)? as u64,
            })
        })
        .map_err(|e| EngineError::Ledger(format!("failed to read ledger: {e}")))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EngineError::Ledger(format!("ledger row error: {e}")))?;

    Ok(entries)
}

/// Look up a single ledger entry by version.
pub fn find(conn: &Connection, version: u64) -> EngineResult<Option<LedgerEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, version, name, checksum, CAST(applied_at AS VARCHAR), execution_time_ms \
             FROM st_meta.schema_migrations WHERE version = ?",
        )
        .map_err(|e| EngineError::Ledger(format!("failed to read ledger: {e}")))?;

    let mut rows = stmt
        .query_map(params![version as i64], |row| {
            Ok(LedgerEntry {
                id: row.get(0)?,
                version: row.get::<_, i64>(1)? as u64,
                name: row.get(2)?,
                checksum: row.get(3)?,
                applied_at: row.get(4)?,
                execution_time_ms: row.get::<_, i64>(5)? as u64,
            })
        })
        .map_err(|e| EngineError::Ledger(format!("failed to read ledger: {e}")))?;

    match rows.next() {
        Some(entry) => entry
            .map(Some)
            .map_err(|e| EngineError::Ledger(format!("ledger row error: {e}"))),
        None => Ok(None),
    }
}

/// Record an applied migration.
///
/// Only ever called from within an executor-owned transaction;
/// `applied_at` is written by the datastore so it commits atomically
/// with the script itself.
pub fn insert(
    conn: &Connection,
    version: u64,
    name: &str,
    checksum: &str,
    execution_time_ms: u64,
) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO st_meta.schema_migrations (version, name, checksum, execution_time_ms) \
         VALUES (?, ?, ?, ?)",
        params![version as i64, name, checksum, execution_time_ms as i64],
    )
    .map_err(|e| EngineError::Ledger(format!("failed to record migration {version}: {e}")))?;
    Ok(())
}

/// Remove a rolled-back migration's entry.
///
/// Only ever called from within an executor-owned transaction.
pub fn delete_by_version(conn: &Connection, version: u64) -> EngineResult<()> {
    conn.execute(
        "DELETE FROM st_meta.schema_migrations WHERE version = ?",
        params![version as i64],
    )
    .map_err(|e| EngineError::Ledger(format!("failed to delete ledger entry {version}: {e}")))?;
    Ok(())
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
