//! Validate command implementation - ledger-vs-disk integrity audit

use anyhow::{Context, Result};
use st_engine::Validator;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, open_database};

/// Execute the validate command
pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let catalog = project.scan_catalog()?;
    let db = open_database(&project, global)?;

    let report = Validator::new(&db, &catalog)
        .validate()
        .context("Validation failed")?;

    if report.is_valid() {
        println!("All applied migrations match their on-disk scripts");
        return Ok(());
    }

    println!("Integrity violations:");
    for violation in &report.violations {
        println!("  ✗ {}", violation);
    }
    println!();
    anyhow::bail!(
        "{} integrity violation(s) found",
        report.violations.len()
    )
}
