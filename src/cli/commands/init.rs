use crate::config::{CONFIG_FILENAME, DEFAULT_DB_FILENAME, WORKSPACE_DIR_NAME};
use crate::error::{IssueBoardError, Result};
use crate::storage::SqliteStorage;
use std::fs;
use std::path::Path;
use tracing::info;

const CONFIG_TEMPLATE: &str = r"# Issue board project configuration
# issue-prefix: ib
# default-priority: Medium
# debounce-ms: 500
";

const GITIGNORE_TEMPLATE: &str = r"# Database
*.db
*.db-shm
*.db-wal

# Login
session.json
";

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created, or the
/// workspace already has a database and `force` is not set.
pub fn execute(prefix: Option<String>, force: bool, root_dir: Option<&Path>) -> Result<()> {
    let base_dir = root_dir.unwrap_or_else(|| Path::new("."));
    let issues_dir = base_dir.join(WORKSPACE_DIR_NAME);
    let db_path = issues_dir.join(DEFAULT_DB_FILENAME);

    if issues_dir.exists() {
        if db_path.exists() && !force {
            return Err(IssueBoardError::AlreadyInitialized { path: db_path });
        }
    } else {
        fs::create_dir(&issues_dir)?;
    }

    let mut storage = SqliteStorage::open(&db_path)?;

    if let Some(p) = prefix {
        let p = p.trim().trim_end_matches('-').to_string();
        if p.is_empty() {
            return Err(IssueBoardError::validation("prefix", "cannot be empty"));
        }
        storage.set_config("issue_prefix", &p)?;
        println!("Prefix set to: {p}");
    }

    let config_path = issues_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        fs::write(config_path, CONFIG_TEMPLATE)?;
    }

    let gitignore_path = issues_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(gitignore_path, GITIGNORE_TEMPLATE)?;
    }

    info!(path = %issues_dir.display(), "workspace initialized");
    println!("Initialized issue workspace in {WORKSPACE_DIR_NAME}/");
    Ok(())
}
