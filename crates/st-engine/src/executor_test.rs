//! Tests for the executor: apply, rollback, reset, drift, atomicity.

use super::*;
use crate::ledger;
use st_core::catalog::{Catalog, ROLLBACK_DIR};
use std::fs;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    db: MigrationDb,
}

fn fixture() -> Fixture {
    Fixture {
        dir: tempfile::tempdir().unwrap(),
        db: MigrationDb::open_memory().unwrap(),
    }
}

impl Fixture {
    fn write(&self, file: &str, sql: &str) {
        fs::write(self.dir.path().join(file), sql).unwrap();
    }

    fn write_rollback(&self, file: &str, sql: &str) {
        let dir = self.dir.path().join(ROLLBACK_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), sql).unwrap();
    }

    /// Rescan the migrations directory (files may have changed).
    fn catalog(&self) -> Catalog {
        Catalog::scan(self.dir.path()).unwrap()
    }

    fn applied_versions(&self) -> Vec<u64> {
        ledger::list_applied(self.db.conn())
            .unwrap()
            .iter()
            .map(|e| e.version)
            .collect()
    }

    fn table_count(&self, table: &str) -> i64 {
        self.db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
                [table],
                |row| row.get(0),
            )
            .unwrap()
    }
}

#[test]
fn apply_pending_applies_in_numeric_order() {
    let fx = fixture();
    // 002 depends on 001's table; lexical order would also pass here,
    // so use 9/10 where lexical order is wrong.
    fx.write("9_create_users.sql", "CREATE TABLE users (id INTEGER);");
    fx.write("10_seed_users.sql", "INSERT INTO users VALUES (1);");

    let catalog = fx.catalog();
    let report = Executor::new(&fx.db, &catalog).apply_pending().unwrap();

    let applied: Vec<u64> = report.applied.iter().map(|m| m.version).collect();
    assert_eq!(applied, vec![9, 10]);
    assert_eq!(fx.applied_versions(), vec![9, 10]);
}

#[test]
fn apply_pending_twice_is_idempotent() {
    let fx = fixture();
    fx.write("001_init.sql", "CREATE TABLE t (id INTEGER);");
    fx.write("002_add_col.sql", "ALTER TABLE t ADD COLUMN c INTEGER;");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);

    let first = executor.apply_pending().unwrap();
    assert_eq!(first.applied.len(), 2);

    let second = executor.apply_pending().unwrap();
    assert!(second.is_up_to_date());
    assert_eq!(fx.applied_versions(), vec![1, 2]);
}

#[test]
fn apply_records_checksum_of_exact_content() {
    let fx = fixture();
    let sql = "CREATE TABLE t (id INTEGER);";
    fx.write("001_init.sql", sql);

    let catalog = fx.catalog();
    Executor::new(&fx.db, &catalog).apply_pending().unwrap();

    let entry = ledger::find(fx.db.conn(), 1).unwrap().unwrap();
    assert_eq!(entry.checksum, compute_checksum(sql.as_bytes()));
    assert_eq!(entry.checksum.len(), 64);
    assert_eq!(entry.name, "init");
}

#[test]
fn failed_migration_rolls_back_schema_and_ledger_together() {
    let fx = fixture();
    fx.write("001_init.sql", "CREATE TABLE t (id INTEGER);");
    fx.write(
        "002_broken.sql",
        "CREATE TABLE half_done (id INTEGER); THIS IS NOT SQL;",
    );

    let catalog = fx.catalog();
    let err = Executor::new(&fx.db, &catalog).apply_pending().unwrap_err();

    assert!(matches!(err, EngineError::Execution { version: 2, .. }));
    assert_eq!(fx.applied_versions(), vec![1], "earlier versions stay committed");
    assert_eq!(
        fx.table_count("half_done"),
        0,
        "partial schema change must not survive the rollback"
    );
}

#[test]
fn apply_stops_at_first_failure() {
    let fx = fixture();
    fx.write("001_init.sql", "CREATE TABLE t (id INTEGER);");
    fx.write("002_broken.sql", "THIS IS NOT SQL;");
    fx.write("003_later.sql", "CREATE TABLE later (id INTEGER);");

    let catalog = fx.catalog();
    let err = Executor::new(&fx.db, &catalog).apply_pending().unwrap_err();

    assert!(matches!(err, EngineError::Execution { version: 2, .. }));
    assert_eq!(fx.applied_versions(), vec![1]);
    assert_eq!(fx.table_count("later"), 0, "no skip-and-continue");
}

#[test]
fn drift_in_applied_script_blocks_new_migrations() {
    let fx = fixture();
    fx.write("001_init.sql", "CREATE TABLE t (id INTEGER);");
    fx.write("002_add_col.sql", "ALTER TABLE t ADD COLUMN c INTEGER;");

    let catalog = fx.catalog();
    Executor::new(&fx.db, &catalog).apply_pending().unwrap();

    // Edit applied history, then add a new migration.
    fx.write("002_add_col.sql", "ALTER TABLE t ADD COLUMN tampered INTEGER;");
    fx.write("003_new.sql", "CREATE TABLE fresh (id INTEGER);");

    let catalog = fx.catalog();
    let err = Executor::new(&fx.db, &catalog).apply_pending().unwrap_err();

    assert!(matches!(err, EngineError::ChecksumMismatch { version: 2, .. }));
    assert_eq!(fx.applied_versions(), vec![1, 2]);
    assert_eq!(fx.table_count("fresh"), 0, "version 3 must not be touched");
}

#[test]
fn ledger_entry_with_foreign_checksum_is_drift() {
    let fx = fixture();
    fx.write("001_init.sql", "CREATE TABLE t (id INTEGER);");

    // Simulate history written by something else: a ledger row whose
    // checksum does not match the on-disk script.
    ledger::ensure_schema(fx.db.conn()).unwrap();
    ledger::insert(fx.db.conn(), 1, "init", "deadbeef", 0).unwrap();

    let catalog = fx.catalog();
    let err = Executor::new(&fx.db, &catalog).apply_pending().unwrap_err();
    assert!(matches!(err, EngineError::ChecksumMismatch { version: 1, .. }));
}

#[test]
fn rollback_without_target_reverses_only_the_latest() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write("002_b.sql", "CREATE TABLE b (id INTEGER);");
    fx.write("003_c.sql", "CREATE TABLE c (id INTEGER);");
    fx.write_rollback("003_c.rollback.sql", "DROP TABLE c;");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let rolled = executor.rollback(None).unwrap().unwrap();
    assert_eq!(rolled.version, 3);
    assert_eq!(fx.applied_versions(), vec![1, 2]);
    assert_eq!(fx.table_count("c"), 0);
    assert_eq!(fx.table_count("a"), 1);
}

#[test]
fn rollback_targets_a_specific_version() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write("002_b.sql", "CREATE TABLE b (id INTEGER);");
    fx.write_rollback("001_a.rollback.sql", "DROP TABLE a;");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let rolled = executor.rollback(Some(1)).unwrap().unwrap();
    assert_eq!(rolled.version, 1);
    assert_eq!(fx.applied_versions(), vec![2]);
}

#[test]
fn rollback_on_empty_ledger_is_a_noop() {
    let fx = fixture();
    let catalog = fx.catalog();
    let outcome = Executor::new(&fx.db, &catalog).rollback(None).unwrap();
    assert!(outcome.is_none());
}

#[test]
fn rollback_unknown_version_fails() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let err = executor.rollback(Some(9)).unwrap_err();
    assert!(matches!(err, EngineError::VersionNotFound { version: 9 }));
}

#[test]
fn rollback_without_script_fails_and_changes_nothing() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write("002_b.sql", "CREATE TABLE b (id INTEGER);");
    // No rollback script for version 2.

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let err = executor.rollback(Some(2)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingRollbackScript { version: 2, .. }
    ));
    assert_eq!(fx.applied_versions(), vec![1, 2], "ledger unchanged");
    assert_eq!(fx.table_count("b"), 1, "schema unchanged");
}

#[test]
fn rollback_then_apply_restores_prior_state() {
    let fx = fixture();
    fx.write("001_users.sql", "CREATE TABLE users (id INTEGER);");
    fx.write_rollback("001_users.rollback.sql", "DROP TABLE users;");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();
    let before = fx.applied_versions();

    executor.rollback(None).unwrap();
    assert_eq!(fx.table_count("users"), 0);

    executor.apply_pending().unwrap();
    assert_eq!(fx.applied_versions(), before);
    assert_eq!(fx.table_count("users"), 1);
}

#[test]
fn failed_rollback_script_leaves_ledger_row_in_place() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write_rollback("001_a.rollback.sql", "THIS IS NOT SQL;");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let err = executor.rollback(None).unwrap_err();
    assert!(matches!(err, EngineError::Execution { version: 1, .. }));
    assert_eq!(fx.applied_versions(), vec![1], "deletion rolled back too");
}

#[test]
fn reset_rolls_back_descending_then_reapplies() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write("002_b.sql", "CREATE TABLE b (id INTEGER);");
    fx.write_rollback("001_a.rollback.sql", "DROP TABLE a;");
    fx.write_rollback("002_b.rollback.sql", "DROP TABLE b;");

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let report = executor.reset().unwrap();

    let rolled: Vec<u64> = report.rolled_back.iter().map(|r| r.version).collect();
    assert_eq!(rolled, vec![2, 1], "strict descending order");

    let reapplied: Vec<u64> = report.apply.applied.iter().map(|m| m.version).collect();
    assert_eq!(reapplied, vec![1, 2]);
    assert_eq!(fx.applied_versions(), vec![1, 2]);
    assert_eq!(fx.table_count("a"), 1);
    assert_eq!(fx.table_count("b"), 1);
}

#[test]
fn reset_stops_at_first_missing_rollback_but_keeps_earlier_work() {
    let fx = fixture();
    fx.write("001_a.sql", "CREATE TABLE a (id INTEGER);");
    fx.write("002_b.sql", "CREATE TABLE b (id INTEGER);");
    fx.write_rollback("002_b.rollback.sql", "DROP TABLE b;");
    // No rollback for 001: reset fails after reversing 002.

    let catalog = fx.catalog();
    let executor = Executor::new(&fx.db, &catalog);
    executor.apply_pending().unwrap();

    let err = executor.reset().unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingRollbackScript { version: 1, .. }
    ));
    // One transaction per entry: 002's reversal is durable, 001 intact.
    assert_eq!(fx.applied_versions(), vec![1]);
    assert_eq!(fx.table_count("b"), 0);
    assert_eq!(fx.table_count("a"), 1);
}
