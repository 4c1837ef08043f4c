//! Create command.
//!
//! Runs the duplicate check first and prints an advisory warning on stderr.
//! Creation proceeds regardless of what the check finds.

use super::Workspace;
use crate::cli::CreateArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::format::format_similar_warning;
use crate::model::{Issue, NewIssue, Priority, Status};
use crate::similarity::check_store;
use crate::storage::IssueStore;
use crate::validation::NewIssueValidator;
use serde::Serialize;
use std::str::FromStr;
use tracing::info;

#[derive(Serialize)]
struct CreateOutput<'a> {
    id: &'a str,
    title: &'a str,
    similar: &'a [Issue],
}

/// Execute the create command.
///
/// # Errors
///
/// Returns `NotLoggedIn` without a current user, a validation error for bad
/// input, or a database error.
pub fn execute(args: CreateArgs, cli: &CliOverrides) -> Result<()> {
    let json = cli.json.unwrap_or(false);
    let mut ws = Workspace::open(cli)?;
    let user = ws.require_user(cli, "create an issue")?;

    let no_check = args.no_check;
    let form = build_form(args, config::default_priority_from_layer(&ws.layer)?)?;
    NewIssueValidator::check(&form)?;

    let similar = if no_check {
        Vec::new()
    } else {
        check_store(&ws.storage, &form.title, &form.description)
    };
    if !similar.is_empty() && !json {
        eprintln!("{}", format_similar_warning(&similar, ws.stderr_format()));
    }

    let id = ws.storage.create(&form, &user.email)?;
    info!(id = %id, created_by = %user, similar = similar.len(), "issue created");

    if json {
        super::print_json(&CreateOutput {
            id: &id,
            title: &form.title,
            similar: &similar,
        })?;
    } else {
        println!("Created {id}: {}", form.title);
    }
    Ok(())
}

fn build_form(args: CreateArgs, default_priority: Priority) -> Result<NewIssue> {
    let priority = args
        .priority
        .as_deref()
        .map_or(Ok(default_priority), Priority::from_str)?;
    let status = args
        .status
        .as_deref()
        .map_or(Ok(Status::Open), Status::from_str)?;

    let mut form = NewIssue::new(args.title.trim(), args.description)
        .with_priority(priority)
        .with_status(status);
    if let Some(assignee) = args.assignee {
        form = form.with_assignee(assignee.trim());
    }
    Ok(form)
}
