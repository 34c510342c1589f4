//! Integrity validator: ledger-vs-disk checksum audit.
//!
//! Read-only pre-flight health check, independent of apply/rollback.
//! Never creates the ledger table and never repairs anything.

use crate::error::EngineResult;
use crate::ledger;
use serde::Serialize;
use st_core::catalog::Catalog;
use st_core::checksum::compute_checksum;
use st_db::MigrationDb;

/// A single integrity violation found by [`Validator::validate`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The on-disk script no longer matches the checksum recorded at
    /// apply time.
    Checksum {
        version: u64,
        expected: String,
        actual: String,
    },
    /// The ledger records a version whose script is no longer on disk
    /// under its recorded name.
    MissingFile { version: u64, name: String },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::Checksum {
                version,
                expected,
                actual,
            } => write!(
                f,
                "version {version}: checksum drift (ledger {expected}, on disk {actual})"
            ),
            Violation::MissingFile { version, name } => {
                write!(f, "version {version}: script '{name}' missing from disk")
            }
        }
    }
}

/// Outcome of an integrity audit.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// True when every ledger entry matches its on-disk script.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The integrity validator.
pub struct Validator<'a> {
    db: &'a MigrationDb,
    catalog: &'a Catalog,
}

impl<'a> Validator<'a> {
    pub fn new(db: &'a MigrationDb, catalog: &'a Catalog) -> Self {
        Self { db, catalog }
    }

    /// Audit every ledger entry against the catalog and the scripts'
    /// current on-disk content.
    ///
    /// A fresh datastore with no ledger table is trivially valid; the
    /// table is not created here.
    pub fn validate(&self) -> EngineResult<ValidationReport> {
        if !ledger::table_exists(self.db.conn())? {
            return Ok(ValidationReport {
                violations: Vec::new(),
            });
        }

        let mut violations = Vec::new();

        for entry in ledger::list_applied(self.db.conn())? {
            // A descriptor under a different name is not the recorded
            // script.
            let descriptor = self
                .catalog
                .find(entry.version)
                .filter(|d| d.name == entry.name);

            let Some(descriptor) = descriptor else {
                violations.push(Violation::MissingFile {
                    version: entry.version,
                    name: entry.name,
                });
                continue;
            };

            match std::fs::read(&descriptor.script_path) {
                Err(_) => violations.push(Violation::MissingFile {
                    version: entry.version,
                    name: entry.name,
                }),
                Ok(bytes) => {
                    let actual = compute_checksum(&bytes);
                    if actual != entry.checksum {
                        violations.push(Violation::Checksum {
                            version: entry.version,
                            expected: entry.checksum,
                            actual,
                        });
                    }
                }
            }
        }

        if !violations.is_empty() {
            log::warn!("Integrity audit found {} violation(s)", violations.len());
        }

        Ok(ValidationReport { violations })
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
