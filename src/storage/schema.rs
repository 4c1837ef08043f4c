//! Database schema definitions and migration logic.

use rusqlite::{Connection, OptionalExtension, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the issue database.
///
/// `issues` keeps its implicit rowid so equal `created_time` values can be
/// ordered by insertion.
pub const SCHEMA_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS issues (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        priority TEXT NOT NULL DEFAULT 'Medium',
        status TEXT NOT NULL DEFAULT 'Open',
        assigned_to TEXT NOT NULL DEFAULT '',
        created_by TEXT NOT NULL,
        created_time TEXT NOT NULL,
        CHECK (length(title) >= 1 AND length(title) <= 500),
        CHECK (priority IN ('Low', 'Medium', 'High')),
        CHECK (status IN ('Open', 'In Progress', 'Done'))
    );

    CREATE INDEX IF NOT EXISTS idx_issues_status ON issues(status);
    CREATE INDEX IF NOT EXISTS idx_issues_priority ON issues(priority);
    CREATE INDEX IF NOT EXISTS idx_issues_created_time ON issues(created_time);

    -- Config (Runtime)
    CREATE TABLE IF NOT EXISTS config (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- Metadata
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
";

/// Apply the schema to the database.
///
/// Idempotent: every statement uses `IF NOT EXISTS`.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    run_migrations(conn)?;

    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(())
}

/// Record the schema version for databases that predate it.
fn run_migrations(conn: &Connection) -> Result<()> {
    let version: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    if version.is_none() {
        conn.execute(
            "INSERT INTO metadata (key, value) VALUES ('schema_version', ?)",
            [CURRENT_SCHEMA_VERSION.to_string()],
        )?;
    }

    Ok(())
}
