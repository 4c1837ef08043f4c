use super::Workspace;
use crate::cli::SimilarArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_similar_warning;
use crate::similarity::check_store;

/// Execute the similar command: run the duplicate check without creating anything.
///
/// # Errors
///
/// Returns `NotLoggedIn` without a current user, or an error if the
/// workspace cannot be opened. Failures while fetching issues are reported
/// as no matches.
pub fn execute(args: &SimilarArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let ws = Workspace::open(cli)?;
    ws.require_user(cli, "search issues")?;
    let matches = check_store(&ws.storage, &args.title, &args.description);

    if json {
        return super::print_json(&matches);
    }
    if matches.is_empty() {
        println!("No similar issues found.");
    } else {
        println!("{}", format_similar_warning(&matches, ws.stdout_format()));
    }
    Ok(())
}
