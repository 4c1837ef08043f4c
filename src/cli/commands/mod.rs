//! Command implementations.
//!
//! Each module exposes an `execute` function called from `main`. Commands
//! that work on an existing workspace start from [`Workspace::open`].

pub mod completions;
pub mod create;
pub mod draft;
pub mod init;
pub mod list;
pub mod login;
pub mod logout;
pub mod show;
pub mod similar;
pub mod status;
pub mod whoami;

use crate::config::{self, CliOverrides, ConfigLayer};
use crate::error::{IssueBoardError, Result, StructuredError};
use crate::format::{TextFormatOptions, terminal_width};
use crate::session::{self, CurrentUser};
use crate::storage::SqliteStorage;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

/// An opened workspace: its directory, store and merged config.
pub struct Workspace {
    pub issues_dir: PathBuf,
    pub storage: SqliteStorage,
    pub layer: ConfigLayer,
}

impl Workspace {
    /// Discover the workspace from the current directory and open it.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` outside a workspace, or a config/database error.
    pub fn open(cli: &CliOverrides) -> Result<Self> {
        let issues_dir = config::discover_issues_dir(Some(Path::new(".")))?;
        Self::open_at(issues_dir, cli)
    }

    /// Open the workspace rooted at `issues_dir`.
    ///
    /// # Errors
    ///
    /// Returns a config or database error.
    pub fn open_at(issues_dir: PathBuf, cli: &CliOverrides) -> Result<Self> {
        let (mut storage, _paths) =
            config::open_storage(&issues_dir, cli.db.as_ref(), cli.lock_timeout)?;
        let layer = config::load_config(&issues_dir, Some(&storage), cli)?;
        storage.set_id_prefix(config::id_config_from_layer(&layer).prefix);
        Ok(Self {
            issues_dir,
            storage,
            layer,
        })
    }

    /// The logged-in user, or `NotLoggedIn` for `action`.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` when nobody is logged in.
    pub fn require_user(&self, cli: &CliOverrides, action: &str) -> Result<CurrentUser> {
        session::require_user(&self.issues_dir, cli, &self.layer, action)
    }

    /// Text options for stdout.
    #[must_use]
    pub fn stdout_format(&self) -> TextFormatOptions {
        let tty = io::stdout().is_terminal();
        TextFormatOptions {
            use_color: tty && !config::no_color_from_layer(&self.layer),
            max_width: tty.then(terminal_width),
        }
    }

    /// Text options for stderr warnings.
    #[must_use]
    pub fn stderr_format(&self) -> TextFormatOptions {
        TextFormatOptions {
            use_color: io::stderr().is_terminal() && !config::no_color_from_layer(&self.layer),
            max_width: None,
        }
    }
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Structured form of `err` for display.
///
/// An unknown issue id is compared against the workspace's ids so the hint
/// can name close matches.
#[must_use]
pub fn describe_error(err: &IssueBoardError, cli: &CliOverrides) -> StructuredError {
    match err {
        IssueBoardError::IssueNotFound { id } if !id.is_empty() => Workspace::open(cli)
            .and_then(|ws| ws.storage.get_all_ids())
            .map_or_else(
                |_| StructuredError::from_error(err),
                |known| StructuredError::issue_not_found(id, &known),
            ),
        _ => StructuredError::from_error(err),
    }
}
