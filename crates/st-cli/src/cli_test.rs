use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
fn no_subcommand_means_up() {
    let cli = Cli::parse_from(["st"]);
    assert!(cli.command.is_none());
}

#[test]
fn down_accepts_a_target_version() {
    let cli = Cli::parse_from(["st", "down", "--version", "2"]);
    match cli.command {
        Some(Commands::Down(args)) => assert_eq!(args.version, Some(2)),
        other => panic!("expected down, got {other:?}"),
    }
}

#[test]
fn status_output_defaults_to_table() {
    let cli = Cli::parse_from(["st", "status"]);
    match cli.command {
        Some(Commands::Status(args)) => assert_eq!(args.output, StatusOutput::Table),
        other => panic!("expected status, got {other:?}"),
    }
}

#[test]
fn status_output_json_parses() {
    let cli = Cli::parse_from(["st", "status", "--output", "json"]);
    match cli.command {
        Some(Commands::Status(args)) => assert_eq!(args.output, StatusOutput::Json),
        other => panic!("expected status, got {other:?}"),
    }
}

#[test]
fn global_args_apply_to_subcommands() {
    let cli = Cli::parse_from(["st", "up", "--verbose", "-p", "/tmp/proj", "-t", "prod"]);
    assert!(cli.global.verbose);
    assert_eq!(cli.global.project_dir, "/tmp/proj");
    assert_eq!(cli.global.target.as_deref(), Some("prod"));
}
