//! Login command: store the current user for the workspace.

use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::session;
use serde_json::json;
use std::path::Path;
use tracing::info;

/// Execute the login command.
///
/// # Errors
///
/// Returns an error outside a workspace, for an invalid identifier, or if
/// the session cannot be written.
pub fn execute(email: &str, json: bool, _cli: &CliOverrides) -> Result<()> {
    let issues_dir = config::discover_issues_dir(Some(Path::new(".")))?;
    let user = session::login(&issues_dir, email)?;
    info!(email = %user, "logged in");

    if json {
        super::print_json(&json!({ "email": user.email }))?;
    } else {
        println!("Logged in as {user}");
    }
    Ok(())
}
