//! Status command: a guarded status change.
//!
//! The guard sees the status the board loaded, so `Open -> Done` is refused
//! before the store is touched.

use super::Workspace;
use crate::board::Board;
use crate::config::CliOverrides;
use crate::error::{IssueBoardError, Result};
use crate::format::format_status_label;
use crate::model::Status;
use crate::storage::ListFilters;
use chrono::Utc;
use serde_json::json;
use std::str::FromStr;

/// Execute the status command.
///
/// # Errors
///
/// Returns `NotLoggedIn` without a current user, `TransitionRejected` for a
/// refused move, `IssueNotFound` or `AmbiguousId` for a bad id, or a
/// database error.
pub fn execute(id: &str, status: &str, json: bool, cli: &CliOverrides) -> Result<()> {
    let requested = Status::from_str(status)?;
    let ws = Workspace::open(cli)?;
    let viewer = ws.require_user(cli, "change an issue's status")?;
    let use_color = ws.stdout_format().use_color;
    let id = ws.storage.resolve_id(id)?;

    let mut board = Board::open(ws.storage, viewer, ListFilters::default())?;
    let previous = board
        .issues()
        .iter()
        .find(|issue| issue.id == id)
        .map(|issue| issue.status)
        .ok_or_else(|| IssueBoardError::IssueNotFound { id: id.clone() })?;

    board.change_status(&id, requested, Utc::now())?;
    if let Some(message) = board.error() {
        eprintln!("Warning: {message}");
    }

    if json {
        super::print_json(&json!({
            "id": id,
            "from": previous,
            "status": requested,
        }))?;
    } else {
        println!(
            "Updated {id}: {} -> {}",
            format_status_label(previous, use_color),
            format_status_label(requested, use_color)
        );
    }
    Ok(())
}
