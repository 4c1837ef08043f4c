//! Logout command.

use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::session;
use serde_json::json;
use std::path::Path;

/// Execute the logout command. Logging out twice is not an error.
///
/// # Errors
///
/// Returns an error outside a workspace or if the session file cannot be removed.
pub fn execute(json: bool, _cli: &CliOverrides) -> Result<()> {
    let issues_dir = config::discover_issues_dir(Some(Path::new(".")))?;
    let removed = session::logout(&issues_dir)?;

    if json {
        super::print_json(&json!({ "logged_out": removed }))?;
    } else if removed {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}
