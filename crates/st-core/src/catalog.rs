//! Migration catalog: on-disk script discovery and ordering.
//!
//! Forward scripts are named `<version>_<name>.sql` and live in the
//! migrations directory. Rollback scripts live in its `rollback/`
//! subdirectory, named identically except for the `.rollback.sql`
//! suffix. Ordering is always by parsed numeric version, never by
//! lexical filename order.

use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Subdirectory of the migrations directory holding rollback scripts
pub const ROLLBACK_DIR: &str = "rollback";

/// Filename suffix marking a rollback script
pub const ROLLBACK_SUFFIX: &str = ".rollback.sql";

/// A discovered migration script and its optional paired rollback.
///
/// Descriptors are derived from the filesystem on every scan and are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDescriptor {
    /// Version parsed from the leading integer of the filename
    pub version: u64,

    /// Name portion of the filename (after the version prefix)
    pub name: String,

    /// Path to the forward script
    pub script_path: PathBuf,

    /// Path to the paired rollback script, if one exists on disk
    pub rollback_path: Option<PathBuf>,
}

impl MigrationDescriptor {
    /// The script's identifier as written on disk, e.g. `001_init`
    pub fn identifier(&self) -> String {
        self.script_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.name.as_str())
            .to_string()
    }
}

/// Parse `<version>_<name>` from a script identifier (the file stem).
///
/// Accepts zero-padded and unpadded version prefixes; `009_x` and
/// `9_x` both parse to version 9. Fails when the identifier has no
/// leading integer, no `_` separator, or an empty name.
pub fn parse_version(identifier: &str) -> CoreResult<(u64, String)> {
    let digits_end = identifier
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(identifier.len());
    if digits_end == 0 {
        return Err(CoreError::MalformedVersion {
            file: identifier.to_string(),
        });
    }

    let version =
        identifier[..digits_end]
            .parse::<u64>()
            .map_err(|_| CoreError::MalformedVersion {
                file: identifier.to_string(),
            })?;

    match identifier[digits_end..].strip_prefix('_') {
        Some(name) if !name.is_empty() => Ok((version, name.to_string())),
        _ => Err(CoreError::MalformedVersion {
            file: identifier.to_string(),
        }),
    }
}

/// The set of migrations discovered in a project's migrations
/// directory, in ascending numeric version order.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    migrations: Vec<MigrationDescriptor>,
}

impl Catalog {
    /// Scan `dir` for migration scripts.
    ///
    /// Creates the directory (empty catalog) if it does not exist —
    /// bootstrap convenience, not an error. Rejects duplicate
    /// versions at discovery time.
    pub fn scan(dir: &Path) -> CoreResult<Self> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            return Ok(Self {
                root: dir.to_path_buf(),
                migrations: Vec::new(),
            });
        }

        let mut seen: HashMap<u64, PathBuf> = HashMap::new();
        let mut migrations = Vec::new();

        for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })? {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();

            // The rollback/ subdirectory is scanned only for pairing.
            if path.is_dir() {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping non-UTF-8 filename in {}", dir.display());
                continue;
            };
            if !file_name.ends_with(".sql") {
                continue;
            }
            // A rollback variant misplaced in the main directory is
            // never a forward migration.
            if file_name.ends_with(ROLLBACK_SUFFIX) {
                log::warn!(
                    "Ignoring rollback script outside {}/: {}",
                    ROLLBACK_DIR,
                    path.display()
                );
                continue;
            }

            let stem = &file_name[..file_name.len() - ".sql".len()];
            let (version, name) = parse_version(stem)?;

            if let Some(first) = seen.get(&version) {
                return Err(CoreError::DuplicateVersion {
                    version,
                    first: first.display().to_string(),
                    second: path.display().to_string(),
                });
            }
            seen.insert(version, path.clone());

            let rollback_path = dir
                .join(ROLLBACK_DIR)
                .join(format!("{stem}{ROLLBACK_SUFFIX}"));
            let rollback_path = rollback_path.exists().then_some(rollback_path);

            migrations.push(MigrationDescriptor {
                version,
                name,
                script_path: path,
                rollback_path,
            });
        }

        // Numeric order, not lexical: 9 sorts before 10 regardless of
        // zero-padding or filesystem enumeration order.
        migrations.sort_by_key(|m| m.version);

        log::debug!(
            "Catalog scan of {} found {} migration(s)",
            dir.display(),
            migrations.len()
        );

        Ok(Self {
            root: dir.to_path_buf(),
            migrations,
        })
    }

    /// All discovered migrations, ascending by version
    pub fn list_all(&self) -> &[MigrationDescriptor] {
        &self.migrations
    }

    /// Look up a migration by version
    pub fn find(&self, version: u64) -> Option<&MigrationDescriptor> {
        self.migrations.iter().find(|m| m.version == version)
    }

    /// The next unused version number (highest + 1, or 1 when empty)
    pub fn next_version(&self) -> u64 {
        self.migrations.last().map_or(1, |m| m.version + 1)
    }

    /// The migrations directory this catalog was scanned from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The rollback subdirectory of this catalog
    pub fn rollback_dir(&self) -> PathBuf {
        self.root.join(ROLLBACK_DIR)
    }

    /// Number of discovered migrations
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// True when no migrations were discovered
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
