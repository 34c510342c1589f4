//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stratum - versioned schema migrations for DuckDB
#[derive(Parser, Debug)]
#[command(name = "st")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (defaults to `up`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override target (database connection)
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations (the default command)
    Up,

    /// Roll back the latest applied migration, or a specific version
    Down(DownArgs),

    /// Show applied and pending migrations without mutating anything
    Status(StatusArgs),

    /// Check applied migrations against their on-disk scripts
    Validate,

    /// Scaffold the next migration script and its rollback stub
    Create(CreateArgs),

    /// Roll back every applied migration, then apply the full catalog
    Reset,

    /// Scaffold a new Stratum project
    Init(InitArgs),
}

/// Arguments for the down command
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Version to roll back (default: the highest applied version)
    #[arg(long)]
    pub version: Option<u64>,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name for the new migration (e.g. add_users_table)
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the new project (a directory with this name is created)
    pub name: String,

    /// Database path written into the generated stratum.yml
    #[arg(long, default_value = "./stratum.duckdb")]
    pub database_path: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
