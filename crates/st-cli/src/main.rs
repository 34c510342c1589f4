//! Stratum CLI - versioned schema migrations for DuckDB

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{create, down, init, reset, status, up, validate};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Bare `st` applies all pending migrations.
    match cli.command.as_ref().unwrap_or(&Commands::Up) {
        Commands::Up => up::execute(&cli.global).await,
        Commands::Down(args) => down::execute(args, &cli.global).await,
        Commands::Status(args) => status::execute(args, &cli.global).await,
        Commands::Validate => validate::execute(&cli.global).await,
        Commands::Create(args) => create::execute(args, &cli.global).await,
        Commands::Reset => reset::execute(&cli.global).await,
        Commands::Init(args) => init::execute(args).await,
    }
}
