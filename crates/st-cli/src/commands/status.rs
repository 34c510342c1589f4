//! Status command implementation - applied vs pending, no mutation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use st_engine::ledger;
use std::collections::HashSet;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{load_project, open_database};

/// One applied migration as shown by `st status`
#[derive(Debug, Serialize)]
struct AppliedRow {
    version: u64,
    name: String,
    applied_at: String,
    execution_time_ms: u64,
}

/// One pending migration as shown by `st status`
#[derive(Debug, Serialize)]
struct PendingRow {
    version: u64,
    name: String,
}

/// Status output file format
#[derive(Debug, Serialize)]
struct StatusReport {
    generated_at: DateTime<Utc>,
    applied: Vec<AppliedRow>,
    pending: Vec<PendingRow>,
}

/// Execute the status command
pub async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let catalog = project.scan_catalog()?;
    let db = open_database(&project, global)?;

    // Read-only: a fresh datastore without a ledger table reports an
    // empty applied set rather than creating the table.
    let applied_entries = if ledger::table_exists(db.conn())? {
        ledger::list_applied(db.conn())?
    } else {
        Vec::new()
    };

    let applied_versions: HashSet<u64> = applied_entries.iter().map(|e| e.version).collect();

    let report = StatusReport {
        generated_at: Utc::now(),
        applied: applied_entries
            .into_iter()
            .map(|e| AppliedRow {
                version: e.version,
                name: e.name,
                applied_at: e.applied_at,
                execution_time_ms: e.execution_time_ms,
            })
            .collect(),
        pending: catalog
            .list_all()
            .iter()
            .filter(|m| !applied_versions.contains(&m.version))
            .map(|m| PendingRow {
                version: m.version,
                name: m.name.clone(),
            })
            .collect(),
    };

    match args.output {
        StatusOutput::Json => print_json(&report)?,
        StatusOutput::Table => print_table(&report),
    }

    Ok(())
}

fn print_json(report: &StatusReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

fn print_table(report: &StatusReport) {
    println!("Applied migrations:");
    if report.applied.is_empty() {
        println!("  (none)");
    }
    for row in &report.applied {
        println!(
            "  {:>4}  {:<32} {} ({}ms)",
            row.version, row.name, row.applied_at, row.execution_time_ms
        );
    }

    println!();
    println!("Pending migrations:");
    if report.pending.is_empty() {
        println!("  (none)");
    }
    for row in &report.pending {
        println!("  {:>4}  {}", row.version, row.name);
    }

    println!();
    println!(
        "{} applied, {} pending",
        report.applied.len(),
        report.pending.len()
    );
}
