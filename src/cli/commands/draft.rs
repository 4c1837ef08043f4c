//! Draft command: a line-driven create form with live duplicate warnings.
//!
//! Reads one edit per line from stdin:
//!
//! ```text
//! title Login page broken
//! description SSO redirect loops
//! priority high
//! assignee carol@example.com
//! submit
//! quit
//! ```
//!
//! Title and description edits schedule a debounced duplicate check; its
//! warnings are printed on stderr as soon as the check completes.

use super::Workspace;
use crate::config::{self, CliOverrides};
use crate::draft::{DraftSession, SimilarityReport};
use crate::error::{IssueBoardError, Result};
use crate::format::{TextFormatOptions, format_similar_warning};
use crate::model::{Priority, Status};
use crate::session::CurrentUser;
use crate::storage::{IssueStore, SqliteStorage};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DraftCommand {
    Title(String),
    Description(String),
    Priority(Priority),
    Status(Status),
    Assignee(String),
    Show,
    Submit,
    Quit,
    Blank,
}

fn parse_line(line: &str) -> Result<DraftCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(DraftCommand::Blank);
    }
    let (keyword, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(k, r)| (k, r.trim()));

    match keyword.to_lowercase().as_str() {
        "title" => Ok(DraftCommand::Title(rest.to_string())),
        "description" | "desc" => Ok(DraftCommand::Description(rest.to_string())),
        "priority" => Priority::from_str(rest).map(DraftCommand::Priority),
        "status" => Status::from_str(rest).map(DraftCommand::Status),
        "assignee" => Ok(DraftCommand::Assignee(rest.to_string())),
        "show" => Ok(DraftCommand::Show),
        "submit" => Ok(DraftCommand::Submit),
        "quit" | "exit" => Ok(DraftCommand::Quit),
        other => Err(IssueBoardError::validation(
            "command",
            format!("unknown draft command '{other}'"),
        )),
    }
}

struct DraftOptions {
    user: CurrentUser,
    delay: Duration,
    default_priority: Priority,
    warnings: TextFormatOptions,
    json: bool,
}

/// Execute the draft command.
///
/// # Errors
///
/// Returns `NotLoggedIn` without a current user, or an error if the
/// workspace or config cannot be loaded, or stdin cannot be read. Per-line
/// problems are reported and the session continues.
pub fn execute(json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    let options = DraftOptions {
        user: ws.require_user(cli, "draft an issue")?,
        delay: config::debounce_from_layer(&ws.layer)?,
        default_priority: config::default_priority_from_layer(&ws.layer)?,
        warnings: ws.stderr_format(),
        json,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let result = runtime.block_on(run(ws.storage, options));
    // A blocking stdin read may still be parked after `quit`.
    runtime.shutdown_background();
    result
}

async fn run(storage: SqliteStorage, options: DraftOptions) -> Result<()> {
    let store = Arc::new(Mutex::new(storage));
    let mut draft =
        DraftSession::new(store, options.delay).with_default_priority(options.default_priority);
    let mut reports = draft.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!(delay = ?options.delay, user = %options.user, "draft session started");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(DraftCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = apply(&mut draft, command, &options).await {
                            eprintln!("{e}");
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            changed = reports.changed() => {
                if changed.is_err() {
                    break;
                }
                let report = reports.borrow_and_update().clone();
                print_report(&report, options.warnings);
            }
        }
    }

    debug!("draft session ended");
    Ok(())
}

async fn apply<S>(
    draft: &mut DraftSession<S>,
    command: DraftCommand,
    options: &DraftOptions,
) -> Result<()>
where
    S: IssueStore + Send + 'static,
{
    match command {
        DraftCommand::Title(title) => draft.set_title(title),
        DraftCommand::Description(description) => draft.set_description(description),
        DraftCommand::Priority(priority) => draft.set_priority(priority),
        DraftCommand::Status(status) => draft.set_status(status),
        DraftCommand::Assignee(assignee) => draft.set_assignee(assignee),
        DraftCommand::Show => {
            let form = draft.form();
            println!("Title: {}", form.title);
            println!("Description: {}", form.description);
            println!("Status: {}  Priority: {}", form.status, form.priority);
            if !form.assigned_to.is_empty() {
                println!("Assigned to: {}", form.assigned_to);
            }
        }
        DraftCommand::Submit => {
            let title = draft.form().title.clone();
            let id = draft.submit(Some(&options.user)).await?;
            if options.json {
                println!("{}", json!({ "id": id, "title": title }));
            } else {
                println!("Created {id}: {title}");
            }
        }
        DraftCommand::Quit | DraftCommand::Blank => {}
    }
    Ok(())
}

fn print_report(report: &SimilarityReport, options: TextFormatOptions) {
    if !report.is_empty() {
        eprintln!("{}", format_similar_warning(&report.matches, options));
    }
}
