//! List command implementation.
//!
//! Goes through [`Board`] so the CLI sees the same filtered, newest-first
//! list as any other front end.

use super::Workspace;
use crate::board::Board;
use crate::cli::ListArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_issue_line_with;
use crate::model::{Priority, Status};
use crate::storage::ListFilters;
use std::str::FromStr;
use tracing::debug;

/// Execute the list command.
///
/// # Errors
///
/// Returns `NotLoggedIn` without a current user, an error for unknown filter
/// values, or the store error if the issues cannot be loaded.
pub fn execute(args: &ListArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let filters = build_filters(args)?;
    let ws = Workspace::open(cli)?;
    let viewer = ws.require_user(cli, "list issues")?;
    let format_options = ws.stdout_format();

    let board = Board::open(ws.storage, viewer, filters)?;
    debug!(
        count = board.issues().len(),
        filtered = !board.filters().is_empty(),
        "listing issues"
    );

    if json {
        return super::print_json(board.issues());
    }

    if board.issues().is_empty() {
        println!("No issues found.");
        return Ok(());
    }
    for issue in board.issues() {
        println!("{}", format_issue_line_with(issue, format_options));
    }
    Ok(())
}

fn build_filters(args: &ListArgs) -> Result<ListFilters> {
    let mut filters = ListFilters::default();
    if let Some(status) = &args.status {
        filters = filters.status(Status::from_str(status)?);
    }
    if let Some(priority) = &args.priority {
        filters = filters.priority(Priority::from_str(priority)?);
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueBoardError;

    #[test]
    fn filters_from_args() {
        let args = ListArgs {
            status: Some("in-progress".to_string()),
            priority: Some("HIGH".to_string()),
        };
        let filters = build_filters(&args).unwrap();
        assert_eq!(filters.status, Some(Status::InProgress));
        assert_eq!(filters.priority, Some(Priority::High));
    }

    #[test]
    fn no_args_means_no_filters() {
        let filters = build_filters(&ListArgs::default()).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let args = ListArgs {
            status: Some("closed".to_string()),
            priority: None,
        };
        assert!(matches!(
            build_filters(&args),
            Err(IssueBoardError::InvalidStatus { .. })
        ));
    }
}
