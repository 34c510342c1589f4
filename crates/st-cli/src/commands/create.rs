//! Create command implementation - scaffolds the next migration pair

use anyhow::{Context, Result};
use st_core::catalog::ROLLBACK_SUFFIX;
use std::fs;

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::load_project;

/// Execute the create command
pub async fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let Some(raw_name) = args.name.as_deref() else {
        anyhow::bail!("Missing migration name. Use: st create --name <name>");
    };

    let name = raw_name.trim().to_lowercase().replace([' ', '-'], "_");
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        anyhow::bail!(
            "Invalid migration name '{}': use letters, digits, and underscores",
            raw_name
        );
    }

    let project = load_project(global)?;
    let catalog = project.scan_catalog()?;

    let version = catalog.next_version();
    let stem = format!("{version:03}_{name}");

    let script_path = catalog.root().join(format!("{stem}.sql"));
    let rollback_dir = catalog.rollback_dir();
    fs::create_dir_all(&rollback_dir).with_context(|| {
        format!("Failed to create directory: {}", rollback_dir.display())
    })?;
    let rollback_path = rollback_dir.join(format!("{stem}{ROLLBACK_SUFFIX}"));

    let script_stub = format!("-- {stem}\n-- Forward schema change for '{name}'.\n");
    fs::write(&script_path, script_stub)
        .with_context(|| format!("Failed to write {}", script_path.display()))?;

    let rollback_stub = format!("-- {stem}\n-- Reverses exactly the forward migration.\n");
    fs::write(&rollback_path, rollback_stub)
        .with_context(|| format!("Failed to write {}", rollback_path.display()))?;

    println!("  Created {}", script_path.display());
    println!("  Created {}", rollback_path.display());
    println!();
    println!("Next migration version: {}", version);

    Ok(())
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
