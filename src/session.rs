//! The current user.
//!
//! The logged-in identity is an explicit value passed into the operations
//! that need it. `ib login` persists it to `<workspace>/session.json`.

use crate::config::{CliOverrides, ConfigLayer, actor_from_layer};
use crate::error::{IssueBoardError, Result};
use crate::util::write_private_file;
use crate::validation::validate_login;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SESSION_FILENAME: &str = "session.json";

/// Environment variable naming the acting user.
pub const ACTOR_ENV: &str = "IB_ACTOR";

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
}

impl CurrentUser {
    /// # Errors
    ///
    /// Returns a validation error for empty identifiers or ones with whitespace.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into().trim().to_string();
        validate_login(&email)?;
        Ok(Self { email })
    }
}

impl fmt::Display for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Persisted login record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    email: String,
    logged_in_at: DateTime<Utc>,
}

#[must_use]
pub fn session_path(issues_dir: &Path) -> PathBuf {
    issues_dir.join(SESSION_FILENAME)
}

/// Store `email` as the workspace's logged-in user.
///
/// # Errors
///
/// Returns a validation error for bad identifiers or an I/O error if the
/// session file cannot be written.
pub fn login(issues_dir: &Path, email: &str) -> Result<CurrentUser> {
    let user = CurrentUser::new(email)?;
    let record = SessionRecord {
        email: user.email.clone(),
        logged_in_at: Utc::now(),
    };
    let json = serde_json::to_string_pretty(&record)?;
    write_private_file(&session_path(issues_dir), &json)?;
    debug!(email = %user.email, "session stored");
    Ok(user)
}

/// Forget the stored session. Returns whether one existed.
///
/// # Errors
///
/// Returns an I/O error if the file exists but cannot be removed.
pub fn logout(issues_dir: &Path) -> Result<bool> {
    match fs::remove_file(session_path(issues_dir)) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Read the stored session, if any.
///
/// # Errors
///
/// Returns an error if the file exists but is unreadable or malformed.
pub fn load_session(issues_dir: &Path) -> Result<Option<CurrentUser>> {
    let path = session_path(issues_dir);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let record: SessionRecord = serde_json::from_str(&contents)?;
    Ok(CurrentUser::new(record.email).ok())
}

/// Resolve the current user.
///
/// Precedence: `--actor`, `IB_ACTOR`, stored session, configured `actor`.
/// There is no fallback to the OS user name.
///
/// # Errors
///
/// Returns an error if the session file is malformed or an explicit
/// identity is invalid.
pub fn current_user(
    issues_dir: &Path,
    overrides: &CliOverrides,
    config: &ConfigLayer,
) -> Result<Option<CurrentUser>> {
    let env_actor = env::var(ACTOR_ENV).ok();
    resolve_user(
        overrides.actor.as_deref(),
        env_actor.as_deref(),
        issues_dir,
        config,
    )
}

fn resolve_user(
    flag: Option<&str>,
    env_actor: Option<&str>,
    issues_dir: &Path,
    config: &ConfigLayer,
) -> Result<Option<CurrentUser>> {
    let explicit = flag
        .or(env_actor)
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(actor) = explicit {
        return CurrentUser::new(actor).map(Some);
    }

    if let Some(user) = load_session(issues_dir)? {
        return Ok(Some(user));
    }

    actor_from_layer(config)
        .map(CurrentUser::new)
        .transpose()
}

/// Like [`current_user`] but fails with `NotLoggedIn` for `action`.
///
/// # Errors
///
/// Returns `NotLoggedIn` when nobody is logged in.
pub fn require_user(
    issues_dir: &Path,
    overrides: &CliOverrides,
    config: &ConfigLayer,
    action: &str,
) -> Result<CurrentUser> {
    current_user(issues_dir, overrides, config)?
        .ok_or_else(|| IssueBoardError::not_logged_in(action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn config_with_actor(actor: &str) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        layer.startup.insert("actor".to_string(), actor.to_string());
        layer
    }

    #[test]
    fn login_then_load() {
        let dir = workspace();
        let user = login(dir.path(), "alice@example.com").unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(load_session(dir.path()).unwrap(), Some(user));
    }

    #[test]
    fn login_rejects_bad_identifiers() {
        let dir = workspace();
        assert!(login(dir.path(), "").is_err());
        assert!(login(dir.path(), "alice smith").is_err());
        assert!(!session_path(dir.path()).exists());
    }

    #[test]
    fn logout_removes_session() {
        let dir = workspace();
        login(dir.path(), "alice@example.com").unwrap();
        assert!(logout(dir.path()).unwrap());
        assert!(!logout(dir.path()).unwrap());
        assert_eq!(load_session(dir.path()).unwrap(), None);
    }

    #[test]
    fn flag_beats_env_beats_session_beats_config() {
        let dir = workspace();
        login(dir.path(), "session@example.com").unwrap();
        let config = config_with_actor("config@example.com");

        let user = resolve_user(Some("flag"), Some("env"), dir.path(), &config).unwrap();
        assert_eq!(user.unwrap().email, "flag");

        let user = resolve_user(None, Some("env"), dir.path(), &config).unwrap();
        assert_eq!(user.unwrap().email, "env");

        let user = resolve_user(None, None, dir.path(), &config).unwrap();
        assert_eq!(user.unwrap().email, "session@example.com");

        logout(dir.path()).unwrap();
        let user = resolve_user(None, None, dir.path(), &config).unwrap();
        assert_eq!(user.unwrap().email, "config@example.com");
    }

    #[test]
    fn nobody_logged_in() {
        let dir = workspace();
        let user = resolve_user(None, None, dir.path(), &ConfigLayer::default()).unwrap();
        assert!(user.is_none());
    }

    #[test]
    fn malformed_session_is_an_error() {
        let dir = workspace();
        fs::write(session_path(dir.path()), "not json").unwrap();
        assert!(matches!(
            load_session(dir.path()),
            Err(IssueBoardError::Json(_))
        ));
    }
}
