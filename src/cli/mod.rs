//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Small team issue tracker with duplicate detection (`SQLite`)
#[derive(Parser, Debug)]
#[command(name = "ib", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: .issues/issues.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Act as this user instead of the stored session
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an issue workspace in the current directory
    Init {
        /// Issue ID prefix (e.g., "ib")
        #[arg(long)]
        prefix: Option<String>,

        /// Overwrite existing DB
        #[arg(long)]
        force: bool,
    },

    /// Store the current user for this workspace
    Login {
        /// Email or user name
        email: String,
    },

    /// Forget the stored user
    Logout,

    /// Show the current user
    Whoami,

    /// Create a new issue
    Create(CreateArgs),

    /// List issues
    List(ListArgs),

    /// Show issue details
    Show {
        /// Issue ID (full or unique partial)
        id: String,
    },

    /// Change an issue's status
    Status {
        /// Issue ID (full or unique partial)
        id: String,

        /// New status (open, in_progress, done)
        status: String,
    },

    /// Look for existing issues similar to a title and description
    Similar(SimilarArgs),

    /// Draft an issue interactively, with live duplicate warnings
    Draft,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output directory (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Issue title
    pub title: String,

    /// Issue description
    #[arg(long, short = 'd')]
    pub description: String,

    /// Priority (low, medium, high)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,

    /// Initial status (default: open)
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Assignee (email or name)
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Skip the duplicate check
    #[arg(long)]
    pub no_check: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only issues with this status
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Only issues with this priority
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SimilarArgs {
    /// Candidate title
    #[arg(long, default_value = "")]
    pub title: String,

    /// Candidate description
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}
