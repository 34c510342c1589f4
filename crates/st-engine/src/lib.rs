//! st-engine - The Stratum migration engine
//!
//! Applies ordered, versioned SQL scripts to a DuckDB datastore,
//! records each applied version in a ledger inside that same
//! datastore, detects post-hoc edits to applied scripts, and reverses
//! changes through paired rollback scripts. Each apply or rollback
//! step runs inside one transaction that also covers the ledger write,
//! so the ledger never drifts from the real schema.
//!
//! Embedding services call this as their startup hook:
//!
//! ```no_run
//! use st_core::Catalog;
//! use st_db::MigrationDb;
//! use st_engine::Executor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = MigrationDb::new("./service.duckdb")?;
//! let catalog = Catalog::scan(std::path::Path::new("migrations"))?;
//! Executor::new(&db, &catalog).apply_pending()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod ledger;
pub mod validator;

pub use error::{EngineError, EngineResult};
pub use executor::{AppliedMigration, ApplyReport, Executor, ResetReport, RolledBack};
pub use ledger::LedgerEntry;
pub use validator::{ValidationReport, Validator, Violation};
