//! Database schema definitions and versioning.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the issues database.
///
/// Timestamps are RFC 3339 text. `open` is 0 or 1. Insertion order is the
/// implicit `rowid`.
pub const SCHEMA_SQL: &str = r"
    CREATE TABLE IF NOT EXISTS issues (
        id TEXT PRIMARY KEY,
        project TEXT NOT NULL,
        issue_title TEXT NOT NULL,
        issue_text TEXT NOT NULL,
        created_by TEXT NOT NULL,
        assigned_to TEXT NOT NULL DEFAULT '',
        status_text TEXT NOT NULL DEFAULT '',
        open INTEGER NOT NULL DEFAULT 1 CHECK(open IN (0, 1)),
        created_on TEXT NOT NULL,
        updated_on TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_issues_project ON issues(project);
";

/// Create tables and record the schema version.
///
/// # Errors
///
/// Returns an error if the schema cannot be applied or the database was
/// written by a newer schema version.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISMATCH),
            Some(format!(
                "database schema version {version} is newer than supported version {CURRENT_SCHEMA_VERSION}"
            )),
        ));
    }

    conn.execute_batch(SCHEMA_SQL)?;

    if version < CURRENT_SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        apply_schema(&conn).unwrap();

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION + 1)
            .unwrap();
        assert!(apply_schema(&conn).is_err());
    }

    #[test]
    fn open_must_be_boolean() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO issues (id, project, issue_title, issue_text, created_by, open, created_on, updated_on)
             VALUES ('a', 'p', 't', 'x', 'c', 2, '', '')",
            [],
        );
        assert!(result.is_err());
    }
}
