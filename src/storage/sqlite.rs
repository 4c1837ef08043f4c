//! `SQLite` storage implementation.

use crate::error::{IssueBoardError, Result};
use crate::model::{Issue, NewIssue, Priority, Status};
use crate::storage::schema::apply_schema;
use crate::storage::{IssueStore, ListFilters};
use crate::util::id::{IdConfig, IdGenerator, IdResolver, find_matching_ids};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const ISSUE_COLUMNS: &str =
    "id, title, description, priority, status, assigned_to, created_by, created_time";

/// SQLite-based issue store.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
    ids: IdGenerator,
}

impl SqliteStorage {
    /// Open a connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        apply_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        let mut storage = Self {
            conn,
            ids: IdGenerator::with_defaults(),
        };
        if let Ok(Some(prefix)) = storage.get_config("issue_prefix") {
            storage.set_id_prefix(prefix);
        }
        storage
    }

    /// Use `prefix` for issue ids created from now on.
    pub fn set_id_prefix(&mut self, prefix: impl Into<String>) {
        self.ids = IdGenerator::new(IdConfig::with_prefix(prefix));
    }

    /// The prefix used for new issue ids.
    #[must_use]
    pub fn id_prefix(&self) -> &str {
        self.ids.prefix()
    }

    /// Run `f` inside an immediate transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let result = f(&tx)?;
        tx.commit()?;
        debug!(op, "mutation committed");
        Ok(result)
    }

    /// Create a new issue and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be inserted.
    pub fn create_issue(&mut self, issue: &NewIssue, created_by: &str) -> Result<String> {
        let ids = self.ids.clone();
        self.mutate("create_issue", |tx| {
            let created_time = Utc::now();
            let count: i64 = tx.query_row("SELECT count(*) FROM issues", [], |row| row.get(0))?;
            let id = ids.generate(
                &issue.title,
                Some(&issue.description),
                Some(created_by),
                created_time,
                usize::try_from(count).unwrap_or(0),
                |candidate| id_exists_in(tx, candidate).unwrap_or(true),
            );

            tx.execute(
                &format!("INSERT INTO issues ({ISSUE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"),
                rusqlite::params![
                    id,
                    issue.title,
                    issue.description,
                    issue.priority.as_str(),
                    issue.status.as_str(),
                    issue.assigned_to,
                    created_by,
                    format_datetime(created_time),
                ],
            )?;
            Ok(id)
        })
    }

    /// Get an issue by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = ?");
        let issue = self
            .conn
            .query_row(&sql, [id], issue_from_row)
            .optional()?;
        Ok(issue)
    }

    /// List issues with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_issues(&self, filters: &ListFilters) -> Result<Vec<Issue>> {
        let mut sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filters.status {
            sql.push_str(" AND status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(priority) = filters.priority {
            sql.push_str(" AND priority = ?");
            params.push(Box::new(priority.as_str()));
        }

        sql.push_str(" ORDER BY created_time DESC, rowid DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let issues = stmt
            .query_map(params_refs.as_slice(), issue_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Update the status of an issue, leaving every other column alone.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if the id does not exist.
    pub fn update_status(&mut self, id: &str, status: Status) -> Result<()> {
        self.mutate("update_status", |tx| {
            let changed = tx.execute(
                "UPDATE issues SET status = ? WHERE id = ?",
                rusqlite::params![status.as_str(), id],
            )?;
            if changed == 0 {
                return Err(IssueBoardError::IssueNotFound { id: id.to_string() });
            }
            Ok(())
        })
    }

    /// Check whether an issue ID exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn id_exists(&self, id: &str) -> Result<bool> {
        Ok(id_exists_in(&self.conn, id)?)
    }

    /// All issue IDs, for partial matching and suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_all_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM issues ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Resolve a full or partial id to exactly one stored id.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` when nothing matches and `AmbiguousId` when
    /// several ids contain the partial hash.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let all_ids = self.get_all_ids()?;
        let resolver = IdResolver::with_prefix(self.id_prefix());
        resolver
            .resolve(
                input,
                |id| all_ids.iter().any(|known| known == id),
                |hash| find_matching_ids(&all_ids, hash),
            )
            .map(|resolved| resolved.id)
    }

    /// Get a runtime config value stored in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM config WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a runtime config value stored in the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub fn set_config(&mut self, key: &str, value: &str) -> Result<()> {
        self.mutate("set_config", |tx| {
            tx.execute(
                "INSERT OR REPLACE INTO config (key, value) VALUES (?, ?)",
                [key, value],
            )?;
            Ok(())
        })
    }

    /// All runtime config rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_all_config(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM config ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Execute raw SQL for test setup.
    #[cfg(test)]
    pub(crate) fn execute_test_sql(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

impl IssueStore for SqliteStorage {
    fn create(&mut self, issue: &NewIssue, created_by: &str) -> Result<String> {
        self.create_issue(issue, created_by)
    }

    fn list(&self, filters: &ListFilters) -> Result<Vec<Issue>> {
        self.list_issues(filters)
    }

    fn set_status(&mut self, id: &str, status: Status) -> Result<()> {
        self.update_status(id, status)
    }

    fn get(&self, id: &str) -> Result<Option<Issue>> {
        self.get_issue(id)
    }
}

fn id_exists_in(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.prepare_cached("SELECT 1 FROM issues WHERE id = ?")?
        .exists([id])
}

fn issue_from_row(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: parse_priority(&row.get::<_, String>(3)?),
        status: parse_status(&row.get::<_, String>(4)?),
        assigned_to: row.get(5)?,
        created_by: row.get(6)?,
        created_time: parse_datetime(7, &row.get::<_, String>(7)?)?,
    })
}

fn parse_status(s: &str) -> Status {
    s.parse().unwrap_or_default()
}

fn parse_priority(s: &str) -> Priority {
    s.parse().unwrap_or_default()
}

/// Fixed-width UTC timestamps so text ordering matches time ordering.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    Err(rusqlite::Error::FromSqlConversionFailure(
        column,
        Type::Text,
        format!("invalid timestamp '{s}'").into(),
    ))
}
