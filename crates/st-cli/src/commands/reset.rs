//! Reset command implementation - rollback-all then apply-all

use anyhow::{Context, Result};
use st_engine::Executor;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, open_database};

/// Execute the reset command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let catalog = project.scan_catalog()?;
    let db = open_database(&project, global)?;

    let report = Executor::new(&db, &catalog)
        .reset()
        .context("Reset failed")?;

    for rolled in &report.rolled_back {
        println!("  ✓ Rolled back {}_{}", rolled.version, rolled.name);
    }
    for migration in &report.apply.applied {
        println!(
            "  ✓ Applied {}_{} ({}ms)",
            migration.version, migration.name, migration.execution_time_ms
        );
    }

    println!();
    println!(
        "Reset complete: {} rolled back, {} applied",
        report.rolled_back.len(),
        report.apply.applied.len()
    );

    Ok(())
}
