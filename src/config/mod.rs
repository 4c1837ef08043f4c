//! Configuration management for `issue_board`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`IB_*`)
//! 3. Project config (.issues/config.yaml)
//! 4. User config (~/.config/ib/config.yaml)
//! 5. DB config table
//! 6. Defaults

use crate::error::{IssueBoardError, Result};
use crate::model::Priority;
use crate::storage::SqliteStorage;
use crate::util::id::{DEFAULT_PREFIX, IdConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Workspace directory name searched for from the current directory upward.
pub const WORKSPACE_DIR_NAME: &str = ".issues";

/// Database filename inside the workspace.
pub const DEFAULT_DB_FILENAME: &str = "issues.db";

/// Project config filename inside the workspace.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Debounce applied to draft similarity checks.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

const DEFAULT_LOCK_TIMEOUT_MS: u64 = 30_000;

/// Resolved paths for this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub issues_dir: PathBuf,
    pub db_path: PathBuf,
}

impl ConfigPaths {
    /// Resolve the database path. Relative overrides are taken from the
    /// workspace directory.
    #[must_use]
    pub fn resolve(issues_dir: &Path, db_override: Option<&PathBuf>) -> Self {
        let db_path = match db_override {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => issues_dir.join(path),
            None => issues_dir.join(DEFAULT_DB_FILENAME),
        };

        Self {
            issues_dir: issues_dir.to_path_buf(),
            db_path,
        }
    }
}

/// Discover the active `.issues` directory.
///
/// Honors `ISSUES_DIR` when set, otherwise walks up from `start` (or CWD).
///
/// # Errors
///
/// Returns `NotInitialized` if no workspace is found, or an I/O error if the
/// CWD cannot be read.
pub fn discover_issues_dir(start: Option<&Path>) -> Result<PathBuf> {
    let env_override = env::var("ISSUES_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    discover_issues_dir_with_env(start, env_override.as_deref())
}

fn discover_issues_dir_with_env(
    start: Option<&Path>,
    env_override: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = env_override {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }

    let mut current = match start {
        Some(path) => std::path::absolute(path)?,
        None => env::current_dir()?,
    };

    loop {
        let candidate = current.join(WORKSPACE_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            break;
        }
    }

    Err(IssueBoardError::NotInitialized)
}

/// Open storage for a workspace, returning the storage and the paths used.
///
/// # Errors
///
/// Returns an error if config cannot be read or the database cannot be opened.
pub fn open_storage(
    issues_dir: &Path,
    db_override: Option<&PathBuf>,
    lock_timeout: Option<u64>,
) -> Result<(SqliteStorage, ConfigPaths)> {
    let startup_layer = load_startup_config(issues_dir)?;
    let resolved_db_override = db_override
        .cloned()
        .or_else(|| db_override_from_layer(&startup_layer));
    let resolved_lock_timeout = lock_timeout
        .or_else(|| lock_timeout_from_layer(&startup_layer))
        .or(Some(DEFAULT_LOCK_TIMEOUT_MS));
    let paths = ConfigPaths::resolve(issues_dir, resolved_db_override.as_ref());
    if !paths.db_path.exists() {
        return Err(IssueBoardError::DatabaseNotFound {
            path: paths.db_path,
        });
    }
    let storage = SqliteStorage::open_with_timeout(&paths.db_path, resolved_lock_timeout)?;
    Ok((storage, paths))
}

/// A configuration layer split into startup-only and runtime (DB) keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub startup: HashMap<String, String>,
    pub runtime: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.startup {
            self.startup.insert(key.clone(), value.clone());
        }
        for (key, value) in &other.runtime {
            self.runtime.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from `IB_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut layer = Self::default();

        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix("IB_") {
                for variant in env_key_variants(stripped) {
                    insert_key_value(&mut layer, &variant, value.clone());
                }
            }
        }

        if env::var_os("NO_COLOR").is_some() {
            insert_key_value(&mut layer, "no-color", "true".to_string());
        }

        layer
    }

    /// Build a layer from DB config table values.
    ///
    /// # Errors
    ///
    /// Returns an error if config table lookup fails.
    pub fn from_db(storage: &SqliteStorage) -> Result<Self> {
        let mut layer = Self::default();
        for (key, value) in storage.get_all_config()? {
            if is_startup_key(&key) {
                continue;
            }
            layer.runtime.insert(key, value);
        }
        Ok(layer)
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db: Option<PathBuf>,
    pub actor: Option<String>,
    pub json: Option<bool>,
    pub no_color: Option<bool>,
    pub lock_timeout: Option<u64>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.db {
            insert_key_value(&mut layer, "db", path.to_string_lossy().to_string());
        }
        if let Some(actor) = &self.actor {
            insert_key_value(&mut layer, "actor", actor.clone());
        }
        if let Some(json) = self.json {
            insert_key_value(&mut layer, "json", json.to_string());
        }
        if self.no_color == Some(true) {
            insert_key_value(&mut layer, "no-color", "true".to_string());
        }
        if let Some(lock_timeout) = self.lock_timeout {
            insert_key_value(&mut layer, "lock-timeout", lock_timeout.to_string());
        }

        layer
    }
}

/// Load project config (.issues/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(issues_dir: &Path) -> Result<ConfigLayer> {
    ConfigLayer::from_yaml(&issues_dir.join(CONFIG_FILENAME))
}

/// Load user config (~/.config/ib/config.yaml).
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("ib")
        .join(CONFIG_FILENAME);
    ConfigLayer::from_yaml(&path)
}

/// Load the file-backed layers only (user + project YAML).
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_file_config(issues_dir: &Path) -> Result<ConfigLayer> {
    let user = load_user_config()?;
    let project = load_project_config(issues_dir)?;
    Ok(ConfigLayer::merge_layers(&[user, project]))
}

/// Load startup-only configuration layers (YAML + env, no DB).
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_startup_config(issues_dir: &Path) -> Result<ConfigLayer> {
    let files = load_file_config(issues_dir)?;
    let env_layer = ConfigLayer::from_env();
    Ok(ConfigLayer::merge_layers(&[files, env_layer]))
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer
        .runtime
        .insert("issue_prefix".to_string(), DEFAULT_PREFIX.to_string());
    layer
        .runtime
        .insert("default_priority".to_string(), Priority::default().to_string());
    layer
        .runtime
        .insert("debounce_ms".to_string(), DEFAULT_DEBOUNCE_MS.to_string());
    layer
}

/// Load configuration with full precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed, or DB access fails.
pub fn load_config(
    issues_dir: &Path,
    storage: Option<&SqliteStorage>,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let db_layer = match storage {
        Some(storage) => ConfigLayer::from_db(storage)?,
        None => ConfigLayer::default(),
    };
    let files = load_file_config(issues_dir)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, db_layer, files, env_layer, cli_layer,
    ]))
}

/// Build ID generation config from a merged config layer.
#[must_use]
pub fn id_config_from_layer(layer: &ConfigLayer) -> IdConfig {
    let prefix = get_value(layer, &["issue_prefix", "issue-prefix", "prefix"])
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let defaults = IdConfig::default();
    IdConfig {
        prefix,
        min_hash_length: parse_usize(layer, &["min_hash_length", "min-hash-length"])
            .unwrap_or(defaults.min_hash_length),
        max_hash_length: parse_usize(layer, &["max_hash_length", "max-hash-length"])
            .unwrap_or(defaults.max_hash_length),
        max_collision_prob: defaults.max_collision_prob,
    }
}

/// Resolve default priority for new issues from config.
///
/// # Errors
///
/// Returns an error if the configured value is not Low, Medium or High.
pub fn default_priority_from_layer(layer: &ConfigLayer) -> Result<Priority> {
    get_value(layer, &["default_priority", "default-priority"])
        .map_or_else(|| Ok(Priority::default()), |value| Priority::from_str(value))
}

/// Resolve the draft debounce delay.
///
/// # Errors
///
/// Returns a config error if the value is not a whole number of milliseconds.
pub fn debounce_from_layer(layer: &ConfigLayer) -> Result<Duration> {
    match get_value(layer, &["debounce_ms", "debounce-ms"]) {
        None => Ok(Duration::from_millis(DEFAULT_DEBOUNCE_MS)),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| IssueBoardError::Config(format!("invalid debounce-ms: {value}"))),
    }
}

/// Actor configured in a merged layer (YAML, env or CLI).
#[must_use]
pub fn actor_from_layer(layer: &ConfigLayer) -> Option<String> {
    get_startup_value(layer, &["actor"])
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Whether colored output has been turned off.
#[must_use]
pub fn no_color_from_layer(layer: &ConfigLayer) -> bool {
    get_startup_value(layer, &["no-color"])
        .and_then(|value| parse_bool(value))
        .unwrap_or(false)
}

/// Determine if a key is startup-only.
///
/// Startup-only keys can only be set in YAML, env or flags, never in the
/// database.
#[must_use]
pub fn is_startup_key(key: &str) -> bool {
    matches!(
        normalize_key(key).as_str(),
        "json" | "db" | "database" | "actor" | "lock-timeout" | "no-color"
    )
}

fn insert_key_value(layer: &mut ConfigLayer, key: &str, value: String) {
    if is_startup_key(key) {
        layer.startup.insert(key.to_string(), value);
    } else {
        layer.runtime.insert(key.to_string(), value);
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn env_key_variants(raw: &str) -> Vec<String> {
    let raw_lower = raw.to_lowercase();
    vec![raw_lower.clone(), raw_lower.replace('_', "-")]
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn get_startup_value<'a>(layer: &'a ConfigLayer, keys: &[&str]) -> Option<&'a String> {
    let normalized_keys: Vec<String> = keys.iter().map(|key| normalize_key(key)).collect();
    layer
        .startup
        .iter()
        .find(|(key, _)| normalized_keys.contains(&normalize_key(key)))
        .map(|(_, value)| value)
}

fn get_value<'a>(layer: &'a ConfigLayer, keys: &[&str]) -> Option<&'a String> {
    keys.iter().find_map(|key| layer.runtime.get(*key))
}

fn parse_usize(layer: &ConfigLayer, keys: &[&str]) -> Option<usize> {
    get_value(layer, keys).and_then(|value| value.trim().parse::<usize>().ok())
}

fn db_override_from_layer(layer: &ConfigLayer) -> Option<PathBuf> {
    get_startup_value(layer, &["db", "database"])
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn lock_timeout_from_layer(layer: &ConfigLayer) -> Option<u64> {
    get_startup_value(layer, &["lock-timeout"]).and_then(|value| value.trim().parse::<u64>().ok())
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        insert_key_value(&mut layer, &key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layer_with(key: &str, value: &str) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        insert_key_value(&mut layer, key, value.to_string());
        layer
    }

    #[test]
    fn merge_precedence_order() {
        let defaults = default_config_layer();
        let db = layer_with("issue_prefix", "db");
        let yaml = layer_with("issue_prefix", "yaml");
        let env_layer = layer_with("issue_prefix", "env");
        let cli = layer_with("issue_prefix", "cli");

        let merged = ConfigLayer::merge_layers(&[defaults, db, yaml, env_layer, cli]);
        assert_eq!(merged.runtime.get("issue_prefix").unwrap(), "cli");
    }

    #[test]
    fn defaults_cover_prefix_priority_and_debounce() {
        let defaults = default_config_layer();
        assert_eq!(id_config_from_layer(&defaults).prefix, "ib");
        assert_eq!(
            default_priority_from_layer(&defaults).unwrap(),
            Priority::Medium
        );
        assert_eq!(
            debounce_from_layer(&defaults).unwrap(),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn yaml_startup_keys_are_separated() {
        let yaml = r"
actor: alice@example.com
issue_prefix: web
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.startup.get("actor").unwrap(), "alice@example.com");
        assert_eq!(layer.runtime.get("issue_prefix").unwrap(), "web");
    }

    #[test]
    fn yaml_nested_keys_flatten_with_dots() {
        let yaml = r"
draft:
  hint: on
";
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).expect("parse yaml");
        let layer = layer_from_yaml_value(&value);
        assert_eq!(layer.runtime.get("draft.hint").unwrap(), "on");
    }

    #[test]
    fn env_vars_map_to_keys() {
        let layer = ConfigLayer::from_vars(vec![
            ("IB_ACTOR".to_string(), "bob".to_string()),
            ("IB_DEBOUNCE_MS".to_string(), "250".to_string()),
            ("OTHER".to_string(), "ignored".to_string()),
        ]);
        assert_eq!(actor_from_layer(&layer).as_deref(), Some("bob"));
        assert_eq!(
            debounce_from_layer(&layer).unwrap(),
            Duration::from_millis(250)
        );
        assert!(!layer.runtime.contains_key("other"));
    }

    #[test]
    fn default_priority_from_layer_uses_config_value() {
        let layer = layer_with("default-priority", "high");
        assert_eq!(default_priority_from_layer(&layer).unwrap(), Priority::High);
    }

    #[test]
    fn default_priority_from_layer_errors_on_invalid_value() {
        let layer = layer_with("default_priority", "urgent");
        assert!(default_priority_from_layer(&layer).is_err());
    }

    #[test]
    fn debounce_rejects_garbage() {
        let layer = layer_with("debounce_ms", "soon");
        assert!(matches!(
            debounce_from_layer(&layer),
            Err(IssueBoardError::Config(_))
        ));
    }

    #[test]
    fn db_layer_skips_startup_keys() {
        let mut storage = SqliteStorage::open_memory().expect("storage");
        storage.set_config("actor", "mallory").expect("set actor");
        storage
            .set_config("issue_prefix", "web")
            .expect("set issue_prefix");

        let layer = ConfigLayer::from_db(&storage).expect("db layer");
        assert!(!layer.startup.contains_key("actor"));
        assert_eq!(layer.runtime.get("issue_prefix").unwrap(), "web");
    }

    #[test]
    fn cli_overrides_win_for_actor() {
        let cli = CliOverrides {
            actor: Some("carol".to_string()),
            no_color: Some(true),
            ..Default::default()
        };
        let merged = ConfigLayer::merge_layers(&[layer_with("actor", "yaml-user"), cli.as_layer()]);
        assert_eq!(actor_from_layer(&merged).as_deref(), Some("carol"));
        assert!(no_color_from_layer(&merged));
    }

    #[test]
    fn discover_issues_dir_uses_env_override() {
        let temp = TempDir::new().expect("tempdir");
        let issues_dir = temp.path().join("elsewhere");
        fs::create_dir_all(&issues_dir).expect("create dir");

        let discovered =
            discover_issues_dir_with_env(Some(temp.path()), Some(&issues_dir)).expect("discover");
        assert_eq!(discovered, issues_dir);
    }

    #[test]
    fn discover_issues_dir_walks_up() {
        let temp = TempDir::new().expect("tempdir");
        let issues_dir = temp.path().join(WORKSPACE_DIR_NAME);
        fs::create_dir_all(&issues_dir).expect("create issues dir");
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).expect("create nested");

        let discovered = discover_issues_dir_with_env(Some(&nested), None).expect("discover");
        assert_eq!(discovered, issues_dir);
    }

    #[test]
    fn discover_without_workspace_is_not_initialized() {
        let temp = TempDir::new().expect("tempdir");
        let result = discover_issues_dir_with_env(Some(temp.path()), None);
        assert!(matches!(result, Err(IssueBoardError::NotInitialized)));
    }

    #[test]
    fn config_paths_resolve_relative_override_inside_workspace() {
        let dir = Path::new("/tmp/project/.issues");
        let paths = ConfigPaths::resolve(dir, Some(&PathBuf::from("custom.db")));
        assert_eq!(paths.db_path, dir.join("custom.db"));

        let paths = ConfigPaths::resolve(dir, None);
        assert_eq!(paths.db_path, dir.join(DEFAULT_DB_FILENAME));
    }

    #[test]
    fn open_storage_requires_database() {
        let temp = TempDir::new().expect("tempdir");
        let issues_dir = temp.path().join(WORKSPACE_DIR_NAME);
        fs::create_dir_all(&issues_dir).expect("create issues dir");

        let result = open_storage(&issues_dir, None, None);
        assert!(matches!(
            result,
            Err(IssueBoardError::DatabaseNotFound { .. })
        ));
    }

    #[test]
    fn startup_layer_reads_lock_timeout() {
        let layer = layer_with("lock_timeout", "2500");
        assert_eq!(lock_timeout_from_layer(&layer), Some(2500));
    }
}
