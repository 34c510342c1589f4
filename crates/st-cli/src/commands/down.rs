//! Down command implementation - rolls back applied migrations

use anyhow::{Context, Result};
use st_engine::Executor;

use crate::cli::{DownArgs, GlobalArgs};
use crate::commands::common::{load_project, open_database};

/// Execute the down command
pub async fn execute(args: &DownArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let catalog = project.scan_catalog()?;
    let db = open_database(&project, global)?;

    let outcome = Executor::new(&db, &catalog)
        .rollback(args.version)
        .context("Rollback failed")?;

    match outcome {
        Some(rolled) => println!("  ✓ Rolled back {}_{}", rolled.version, rolled.name),
        None => println!("Nothing to roll back"),
    }

    Ok(())
}
