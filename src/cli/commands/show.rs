use super::Workspace;
use crate::config::CliOverrides;
use crate::error::{IssueBoardError, Result};
use crate::format::format_issue_details;

/// Execute the show command.
///
/// # Errors
///
/// Returns `NotLoggedIn` without a current user, or `IssueNotFound` /
/// `AmbiguousId` if `id` does not name exactly one issue.
pub fn execute(id: &str, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    ws.require_user(cli, "view an issue")?;
    let id = ws.storage.resolve_id(id)?;
    let issue = ws
        .storage
        .get_issue(&id)?
        .ok_or(IssueBoardError::IssueNotFound { id })?;

    if json {
        return super::print_json(&issue);
    }
    println!(
        "{}",
        format_issue_details(&issue, ws.stdout_format().use_color)
    );
    Ok(())
}
