//! Up command implementation - applies all pending migrations

use anyhow::{Context, Result};
use st_engine::Executor;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, open_database};

/// Execute the up command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let catalog = project.scan_catalog()?;
    let db = open_database(&project, global)?;

    if global.verbose {
        eprintln!("[verbose] {} migration(s) in catalog", catalog.len());
    }

    let report = Executor::new(&db, &catalog)
        .apply_pending()
        .context("Migration run failed")?;

    if report.is_up_to_date() {
        println!("Database is up to date");
        return Ok(());
    }

    for migration in &report.applied {
        println!(
            "  ✓ Applied {}_{} ({}ms)",
            migration.version, migration.name, migration.execution_time_ms
        );
    }
    println!();
    println!("Applied {} migration(s)", report.applied.len());

    Ok(())
}
