use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::session;
use serde_json::json;
use std::path::Path;

/// Execute the whoami command.
///
/// # Errors
///
/// Returns an error outside a workspace or if the stored session is malformed.
pub fn execute(json: bool, cli: &CliOverrides) -> Result<()> {
    let issues_dir = config::discover_issues_dir(Some(Path::new(".")))?;
    let layer = config::load_config(&issues_dir, None, cli)?;
    let user = session::current_user(&issues_dir, cli, &layer)?;

    if json {
        let email = user.as_ref().map(|u| u.email.as_str());
        super::print_json(&json!({ "email": email }))?;
    } else {
        match user {
            Some(user) => println!("{user}"),
            None => println!("Not logged in"),
        }
    }
    Ok(())
}
