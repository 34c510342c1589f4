//! Migration executor: the orchestrator for apply, rollback, and reset.
//!
//! Strictly sequential, single-writer. Each apply or rollback step is
//! one transaction covering both the script execution and the ledger
//! write, so a crash at any point leaves the ledger exactly consistent
//! with the datastore's real schema.

use crate::error::{EngineError, EngineResult};
use crate::ledger::{self, LedgerEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use st_core::catalog::{Catalog, MigrationDescriptor, ROLLBACK_SUFFIX};
use st_core::checksum::compute_checksum;
use st_core::error::CoreError;
use st_db::MigrationDb;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

/// One migration applied during an [`Executor::apply_pending`] run.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    pub version: u64,
    pub name: String,
    pub execution_time_ms: u64,
}

/// Result of an apply run. Zero applied means "up to date".
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub started_at: DateTime<Utc>,
    pub applied: Vec<AppliedMigration>,
}

impl ApplyReport {
    /// True when nothing was pending.
    pub fn is_up_to_date(&self) -> bool {
        self.applied.is_empty()
    }
}

/// One migration reversed by rollback.
#[derive(Debug, Clone, Serialize)]
pub struct RolledBack {
    pub version: u64,
    pub name: String,
}

/// Result of a reset: everything rolled back, then everything
/// re-applied.
#[derive(Debug, Serialize)]
pub struct ResetReport {
    pub rolled_back: Vec<RolledBack>,
    pub apply: ApplyReport,
}

/// The migration executor.
///
/// Borrows the connection and catalog; the caller owns both
/// lifecycles. There is no global datastore handle anywhere in the
/// engine.
pub struct Executor<'a> {
    db: &'a MigrationDb,
    catalog: &'a Catalog,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a MigrationDb, catalog: &'a Catalog) -> Self {
        Self { db, catalog }
    }

    /// Apply every pending migration in ascending version order.
    ///
    /// Fails fast: the first error stops the run, and migrations
    /// committed before it stay committed. Running twice in a row is
    /// idempotent — the second run applies nothing.
    pub fn apply_pending(&self) -> EngineResult<ApplyReport> {
        ledger::ensure_schema(self.db.conn())?;

        let applied_entries = ledger::list_applied(self.db.conn())?;
        self.check_applied_integrity(&applied_entries)?;

        let applied_versions: HashSet<u64> =
            applied_entries.iter().map(|e| e.version).collect();

        let started_at = Utc::now();
        let mut applied = Vec::new();

        for descriptor in self.catalog.list_all() {
            if applied_versions.contains(&descriptor.version) {
                continue;
            }
            if let Some(migration) = self.apply_one(descriptor)? {
                applied.push(migration);
            }
        }

        Ok(ApplyReport {
            started_at,
            applied,
        })
    }

    /// Verify no already-applied script has been edited on disk.
    ///
    /// Drift aborts the run before any pending migration is attempted.
    /// Entries whose script is no longer in the catalog can't be
    /// checksummed here; the validator reports those.
    fn check_applied_integrity(&self, entries: &[LedgerEntry]) -> EngineResult<()> {
        for entry in entries {
            let Some(descriptor) = self.catalog.find(entry.version) else {
                continue;
            };
            let actual = compute_checksum(read_script(descriptor)?.as_bytes());
            if actual != entry.checksum {
                return Err(EngineError::ChecksumMismatch {
                    version: entry.version,
                    expected: entry.checksum.clone(),
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Apply a single pending migration inside one transaction.
    ///
    /// Returns `None` when a defensive ledger re-check finds the same
    /// version already applied with a matching checksum (another
    /// process got there first — idempotent no-op).
    fn apply_one(&self, descriptor: &MigrationDescriptor) -> EngineResult<Option<AppliedMigration>> {
        let sql = read_script(descriptor)?;
        let checksum = compute_checksum(sql.as_bytes());

        if let Some(existing) = ledger::find(self.db.conn(), descriptor.version)? {
            if existing.checksum == checksum {
                log::debug!(
                    "Migration {} already applied, skipping",
                    descriptor.identifier()
                );
                return Ok(None);
            }
            return Err(EngineError::ChecksumMismatch {
                version: descriptor.version,
                expected: existing.checksum,
                actual: checksum,
            });
        }

        log::debug!("Applying migration {}", descriptor.identifier());
        let started = Instant::now();

        let execution_time_ms = self.db.transaction(|conn| -> EngineResult<u64> {
            conn.execute_batch(&sql)
                .map_err(|e| EngineError::Execution {
                    version: descriptor.version,
                    message: e.to_string(),
                })?;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            ledger::insert(
                conn,
                descriptor.version,
                &descriptor.name,
                &checksum,
                elapsed_ms,
            )?;
            Ok(elapsed_ms)
        })?;

        Ok(Some(AppliedMigration {
            version: descriptor.version,
            name: descriptor.name.clone(),
            execution_time_ms,
        }))
    }

    /// Roll back one applied migration.
    ///
    /// With a target version, that exact ledger entry is reversed
    /// (`VersionNotFound` if absent). Without one, the highest applied
    /// version is reversed; an empty ledger is a no-op, not an error.
    pub fn rollback(&self, target_version: Option<u64>) -> EngineResult<Option<RolledBack>> {
        ledger::ensure_schema(self.db.conn())?;
        let applied = ledger::list_applied(self.db.conn())?;

        let entry = match target_version {
            Some(version) => applied
                .iter()
                .find(|e| e.version == version)
                .cloned()
                .ok_or(EngineError::VersionNotFound { version })?,
            None => match applied.last() {
                Some(entry) => entry.clone(),
                None => {
                    log::debug!("Ledger is empty, nothing to roll back");
                    return Ok(None);
                }
            },
        };

        self.rollback_entry(&entry).map(Some)
    }

    /// Roll back every applied migration in descending version order,
    /// then apply the full catalog again.
    ///
    /// One transaction per entry — a failure partway leaves a
    /// consistent, inspectable ledger rather than an aborted
    /// mega-transaction.
    pub fn reset(&self) -> EngineResult<ResetReport> {
        ledger::ensure_schema(self.db.conn())?;
        let applied = ledger::list_applied(self.db.conn())?;

        let mut rolled_back = Vec::new();
        for entry in applied.iter().rev() {
            rolled_back.push(self.rollback_entry(entry)?);
        }

        let apply = self.apply_pending()?;
        Ok(ResetReport { rolled_back, apply })
    }

    /// Execute one rollback script plus its ledger deletion atomically.
    fn rollback_entry(&self, entry: &LedgerEntry) -> EngineResult<RolledBack> {
        let script_path =
            self.resolve_rollback_script(entry)
                .ok_or_else(|| EngineError::MissingRollbackScript {
                    version: entry.version,
                    name: entry.name.clone(),
                })?;

        let sql = std::fs::read_to_string(&script_path).map_err(|e| {
            EngineError::Core(CoreError::IoWithPath {
                path: script_path.display().to_string(),
                source: e,
            })
        })?;

        log::debug!("Rolling back migration {} ('{}')", entry.version, entry.name);

        self.db.transaction(|conn| {
            conn.execute_batch(&sql)
                .map_err(|e| EngineError::Execution {
                    version: entry.version,
                    message: e.to_string(),
                })?;
            ledger::delete_by_version(conn, entry.version)
        })?;

        Ok(RolledBack {
            version: entry.version,
            name: entry.name.clone(),
        })
    }

    /// Find the rollback script paired with a ledger entry.
    ///
    /// Prefers the catalog descriptor's pairing. When the forward
    /// script is gone from disk, falls back to the naming contract
    /// (padded and unpadded version prefixes).
    fn resolve_rollback_script(&self, entry: &LedgerEntry) -> Option<PathBuf> {
        if let Some(descriptor) = self.catalog.find(entry.version) {
            return descriptor.rollback_path.clone();
        }

        let dir = self.catalog.rollback_dir();
        let stems = [
            format!("{:03}_{}", entry.version, entry.name),
            format!("{}_{}", entry.version, entry.name),
        ];
        stems
            .iter()
            .map(|stem| dir.join(format!("{stem}{ROLLBACK_SUFFIX}")))
            .find(|candidate| candidate.exists())
    }
}

/// Read a forward script's exact content.
fn read_script(descriptor: &MigrationDescriptor) -> EngineResult<String> {
    std::fs::read_to_string(&descriptor.script_path).map_err(|e| {
        EngineError::Core(CoreError::IoWithPath {
            path: descriptor.script_path.display().to_string(),
            source: e,
        })
    })
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
