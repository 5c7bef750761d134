//! `SQLite` storage implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use issues_core::util::generate_id;
use issues_core::{Filter, Issue, IssueError, IssuePatch, IssueStore};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};

use crate::error::Result;
use crate::storage::schema::apply_schema;

const ISSUE_COLUMNS: &str = "id, issue_title, issue_text, created_by, assigned_to, status_text, open, created_on, updated_on";

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based issue store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema
    /// application fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        apply_schema(&conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of issues in `project`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn count(&self, project: &str) -> issues_core::Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM issues WHERE project = ?1",
                [project],
                |row| row.get(0),
            )
            .map_err(storage_err)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn lock(&self) -> issues_core::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| IssueError::storage("connection lock poisoned"))
    }
}

fn storage_err(err: rusqlite::Error) -> IssueError {
    IssueError::storage(err)
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    Ok(Issue {
        id: row.get(0)?,
        issue_title: row.get(1)?,
        issue_text: row.get(2)?,
        created_by: row.get(3)?,
        assigned_to: row.get(4)?,
        status_text: row.get(5)?,
        open: row.get(6)?,
        created_on: parse_timestamp(row, 7)?,
        updated_on: parse_timestamp(row, 8)?,
    })
}

fn select_by_id(tx: &Connection, project: &str, id: &str) -> rusqlite::Result<Option<Issue>> {
    tx.query_row(
        &format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE project = ?1 AND id = ?2"),
        params![project, id],
        issue_from_row,
    )
    .optional()
}

fn id_exists(tx: &Transaction<'_>, id: &str) -> rusqlite::Result<bool> {
    tx.query_row("SELECT 1 FROM issues WHERE id = ?1", [id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
}

impl IssueStore for SqliteStore {
    fn insert(&self, project: &str, mut issue: Issue) -> issues_core::Result<Issue> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage_err)?;

        // A failed existence check falls through to the INSERT, whose
        // primary key constraint then reports the real error.
        issue.id = generate_id(
            project,
            &issue.issue_title,
            &issue.created_by,
            Utc::now(),
            |candidate| id_exists(&tx, candidate).unwrap_or(false),
        );

        tx.execute(
            &format!(
                "INSERT INTO issues (project, {ISSUE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
            ),
            params![
                project,
                issue.id,
                issue.issue_title,
                issue.issue_text,
                issue.created_by,
                issue.assigned_to,
                issue.status_text,
                issue.open,
                timestamp(issue.created_on),
                timestamp(issue.updated_on),
            ],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)?;

        tracing::debug!(project, id = %issue.id, "inserted issue");
        Ok(issue)
    }

    fn find(&self, project: &str, filter: &Filter) -> issues_core::Result<Vec<Issue>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(&format!(
                "SELECT {ISSUE_COLUMNS} FROM issues WHERE project = ?1 ORDER BY rowid"
            ))
            .map_err(storage_err)?;
        let rows = stmt
            .query_map([project], issue_from_row)
            .map_err(storage_err)?;

        let mut issues = Vec::new();
        for row in rows {
            let issue = row.map_err(storage_err)?;
            if filter.matches(&issue) {
                issues.push(issue);
            }
        }
        Ok(issues)
    }

    fn find_by_id(&self, project: &str, id: &str) -> issues_core::Result<Option<Issue>> {
        let conn = self.lock()?;
        select_by_id(&conn, project, id).map_err(storage_err)
    }

    fn update_by_id(
        &self,
        project: &str,
        id: &str,
        patch: &IssuePatch,
    ) -> issues_core::Result<Option<Issue>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(storage_err)?;

        let Some(mut issue) = select_by_id(&tx, project, id).map_err(storage_err)? else {
            return Ok(None);
        };
        patch.apply_to(&mut issue);

        tx.execute(
            "UPDATE issues
             SET issue_title = ?1, issue_text = ?2, created_by = ?3, assigned_to = ?4,
                 status_text = ?5, open = ?6, updated_on = ?7
             WHERE project = ?8 AND id = ?9",
            params![
                issue.issue_title,
                issue.issue_text,
                issue.created_by,
                issue.assigned_to,
                issue.status_text,
                issue.open,
                timestamp(issue.updated_on),
                project,
                id,
            ],
        )
        .map_err(storage_err)?;
        tx.commit().map_err(storage_err)?;

        tracing::debug!(project, id, "updated issue");
        Ok(Some(issue))
    }

    fn delete_by_id(&self, project: &str, id: &str) -> issues_core::Result<bool> {
        let conn = self.lock()?;
        let removed = conn
            .execute(
                "DELETE FROM issues WHERE project = ?1 AND id = ?2",
                params![project, id],
            )
            .map_err(storage_err)?;

        if removed > 0 {
            tracing::debug!(project, id, "deleted issue");
        }
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issues_core::InMemoryStore;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    fn make_issue(title: &str) -> Issue {
        Issue::new(title, "text", "tester", Utc::now())
    }

    #[test]
    fn insert_assigns_valid_id() {
        crate::logging::init_test_logging();
        let store = SqliteStore::open_memory().unwrap();
        let issue = store.insert("apitest", make_issue("one")).unwrap();
        assert!(issues_core::util::is_valid_id(&issue.id));

        let found = store.find_by_id("apitest", &issue.id).unwrap();
        assert_eq!(found, Some(issue));
    }

    #[test]
    fn find_preserves_insertion_order() {
        let store = SqliteStore::open_memory().unwrap();
        for title in ["c", "a", "b"] {
            store.insert("p", make_issue(title)).unwrap();
        }

        let titles: Vec<String> = store
            .find("p", &Filter::all())
            .unwrap()
            .into_iter()
            .map(|issue| issue.issue_title)
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn projects_are_isolated() {
        let store = SqliteStore::open_memory().unwrap();
        let issue = store.insert("alpha", make_issue("one")).unwrap();
        store.insert("beta", make_issue("two")).unwrap();

        assert_eq!(store.count("alpha").unwrap(), 1);
        assert!(store.find_by_id("beta", &issue.id).unwrap().is_none());
        assert!(!store.delete_by_id("beta", &issue.id).unwrap());
        assert!(
            store
                .update_by_id("beta", &issue.id, &IssuePatch::default())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn find_applies_filter() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert("p", make_issue("keep")).unwrap();
        store.insert("p", make_issue("drop")).unwrap();

        let found = store
            .find("p", &Filter::all().with("issue_title", "keep"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].issue_title, "keep");
    }

    #[test]
    fn update_changes_only_patched_fields() {
        crate::logging::init_test_logging();
        let store = SqliteStore::open_memory().unwrap();
        let issue = store.insert("p", make_issue("before")).unwrap();

        let patch = IssuePatch {
            issue_title: Some("after".to_string()),
            open: Some(false),
            ..IssuePatch::default()
        };
        let updated = store.update_by_id("p", &issue.id, &patch).unwrap().unwrap();

        assert_eq!(updated.issue_title, "after");
        assert!(!updated.open);
        assert_eq!(updated.issue_text, issue.issue_text);
        assert_eq!(updated.created_on, issue.created_on);
        assert!(updated.updated_on > issue.updated_on);

        let stored = store.find_by_id("p", &issue.id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn delete_removes_once() {
        let store = SqliteStore::open_memory().unwrap();
        let issue = store.insert("p", make_issue("gone")).unwrap();

        assert!(store.delete_by_id("p", &issue.id).unwrap());
        assert!(!store.delete_by_id("p", &issue.id).unwrap());
        assert_eq!(store.count("p").unwrap(), 0);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.db");

        let id = {
            let store = SqliteStore::open(&path).unwrap();
            store.insert("p", make_issue("durable")).unwrap().id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        let issue = reopened.find_by_id("p", &id).unwrap().unwrap();
        assert_eq!(issue.issue_title, "durable");
    }

    #[test]
    fn concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(SqliteStore::open_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .insert("p", make_issue(&format!("same-{}", i % 2)))
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.count("p").unwrap(), 8);
    }

    fn summary(issues: Vec<Issue>) -> Vec<(String, String)> {
        issues
            .into_iter()
            .map(|issue| (issue.issue_title, issue.assigned_to))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn find_agrees_with_in_memory_store(
            rows in proptest::collection::vec(("[ab]", "[xy]"), 0..12),
            title in "[ab]",
        ) {
            let sqlite = SqliteStore::open_memory().unwrap();
            let memory = InMemoryStore::new();
            for (row_title, assignee) in &rows {
                let mut issue = make_issue(row_title);
                issue.assigned_to.clone_from(assignee);
                sqlite.insert("p", issue.clone()).unwrap();
                memory.insert("p", issue).unwrap();
            }

            let filter = Filter::all().with("issue_title", title.as_str());
            prop_assert_eq!(
                summary(sqlite.find("p", &filter).unwrap()),
                summary(memory.find("p", &filter).unwrap())
            );
        }
    }
}
