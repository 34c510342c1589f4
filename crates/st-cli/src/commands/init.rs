//! Init command implementation - scaffolds a new Stratum project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;

/// Execute the init command
pub(crate) async fn execute(args: &InitArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Stratum project: {}\n", args.name);

    // Create directory structure
    let dirs = ["", "migrations", "migrations/rollback"];
    for dir in &dirs {
        let path = project_dir.join(dir);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }

    // Generate stratum.yml
    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

migrations_path: migrations

database:
  type: duckdb
  path: "{db_path}"

# targets:
#   prod:
#     database:
#       type: duckdb
#       path: "/srv/data/{name}.duckdb"
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("stratum.yml"), config_content)
        .context("Failed to write stratum.yml")?;

    // Generate example migration pair
    let example_sql = r#"-- 001_init
CREATE TABLE example (
    id INTEGER PRIMARY KEY,
    name VARCHAR NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT now()
);
"#;
    fs::write(project_dir.join("migrations/001_init.sql"), example_sql)
        .context("Failed to write example migration")?;

    let example_rollback = "-- 001_init\nDROP TABLE example;\n";
    fs::write(
        project_dir.join("migrations/rollback/001_init.rollback.sql"),
        example_rollback,
    )
    .context("Failed to write example rollback")?;

    // Generate .gitignore
    let gitignore = "*.duckdb\n*.duckdb.wal\n";
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    println!("  Created stratum.yml");
    println!("  Created migrations/001_init.sql");
    println!("  Created migrations/rollback/001_init.rollback.sql");
    println!("  Created .gitignore");
    println!();
    println!("Project '{}' initialized successfully!", args.name);
    println!();
    println!("Next steps:");
    println!("  cd {}", args.name);
    println!("  st status     # Show applied and pending migrations");
    println!("  st up         # Apply all pending migrations");

    Ok(())
}
