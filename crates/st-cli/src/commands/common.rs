//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use st_core::{Catalog, Config};
use st_db::MigrationDb;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// A loaded project: its configuration plus the root directory it was
/// loaded from.
pub(crate) struct ProjectContext {
    pub root: PathBuf,
    pub config: Config,
}

impl ProjectContext {
    /// Scan the project's migrations directory.
    pub(crate) fn scan_catalog(&self) -> Result<Catalog> {
        Catalog::scan(&self.config.migrations_path_absolute(&self.root))
            .context("Failed to scan migrations directory")
    }
}

/// Load stratum.yml from `--config` or the project directory.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<ProjectContext> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project config")?;

    Ok(ProjectContext { root, config })
}

/// Open the target database, applying `--target` / `ST_TARGET`
/// overrides from the project config.
pub(crate) fn open_database(project: &ProjectContext, global: &GlobalArgs) -> Result<MigrationDb> {
    let resolved_target = Config::resolve_target(global.target.as_deref());
    let db_config = project
        .config
        .get_database_config(resolved_target.as_deref())
        .context("Failed to get database configuration")?;

    if global.verbose {
        eprintln!(
            "[verbose] Using {} database at {}",
            db_config.db_type, db_config.path
        );
    }

    let db = MigrationDb::new(&db_config.path).context("Failed to connect to database")?;
    Ok(db)
}
