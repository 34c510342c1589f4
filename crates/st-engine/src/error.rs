//! Error types for the migration engine.

use st_core::CoreError;
use st_db::DbError;
use thiserror::Error;

/// Migration engine errors.
///
/// All variants are fatal to the current command invocation: schema
/// changes are not safely retryable without human judgment, so the
/// engine never retries on its own.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Ledger query or DDL failed (M001).
    #[error("[M001] Ledger operation failed: {0}")]
    Ledger(String),

    /// An applied script was altered after being recorded (M002).
    #[error("[M002] Checksum mismatch for migration {version}: ledger has {expected}, script on disk has {actual}")]
    ChecksumMismatch {
        version: u64,
        expected: String,
        actual: String,
    },

    /// Rollback requested but no paired rollback script exists (M003).
    #[error("[M003] No rollback script for migration {version} ('{name}')")]
    MissingRollbackScript { version: u64, name: String },

    /// Rollback target version is not recorded in the ledger (M004).
    #[error("[M004] Version {version} is not recorded in the ledger")]
    VersionNotFound { version: u64 },

    /// The migration script itself failed against the datastore (M005).
    #[error("[M005] Migration {version} failed: {message}")]
    Execution { version: u64, message: String },

    /// Core error with preserved source chain (M006).
    #[error("[M006] Catalog error")]
    Core(#[source] CoreError),

    /// Database error with preserved source chain (M007).
    #[error("[M007] Database error")]
    Db(#[source] DbError),
}

/// Result type alias for [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        EngineError::Core(err)
    }
}

impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        EngineError::Db(err)
    }
}
