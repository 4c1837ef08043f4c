use clap::Parser;
use issue_board::cli::commands;
use issue_board::cli::{Cli, Commands};
use issue_board::config;
use issue_board::logging::init_logging;
use issue_board::IssueBoardError;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, None) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);

    let result = match cli.command {
        Commands::Init { prefix, force } => commands::init::execute(prefix, force, None),
        Commands::Login { email } => commands::login::execute(&email, cli.json, &overrides),
        Commands::Logout => commands::logout::execute(cli.json, &overrides),
        Commands::Whoami => commands::whoami::execute(cli.json, &overrides),
        Commands::Create(args) => commands::create::execute(args, &overrides),
        Commands::List(args) => commands::list::execute(&args, cli.json, &overrides),
        Commands::Show { id } => commands::show::execute(&id, cli.json, &overrides),
        Commands::Status { id, status } => {
            commands::status::execute(&id, &status, cli.json, &overrides)
        }
        Commands::Similar(args) => commands::similar::execute(&args, cli.json, &overrides),
        Commands::Draft => commands::draft::execute(cli.json, &overrides),
        Commands::Completions(args) => commands::completions::execute(&args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json, &overrides);
    }
}

/// Report `err` and exit with its category's code.
///
/// JSON goes to stderr when `--json` is set or stdout is not a terminal;
/// otherwise a human-readable message, colored when stderr is a terminal.
fn handle_error(err: &IssueBoardError, json_mode: bool, overrides: &config::CliOverrides) -> ! {
    let structured = commands::describe_error(err, overrides);
    let exit_code = structured.code.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    config::CliOverrides {
        db: cli.db.clone(),
        actor: cli.actor.clone(),
        json: Some(cli.json),
        no_color: Some(cli.no_color),
        lock_timeout: cli.lock_timeout,
    }
}
