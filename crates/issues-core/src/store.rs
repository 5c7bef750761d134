//! Store abstraction and the in-memory store.
//!
//! [`IssueStore`] is the persistence seam the service talks to. Every
//! method is one atomic operation from the caller's point of view.
//! [`InMemoryStore`] keeps each project's issues in insertion order and can
//! optionally write through to a JSONL file. Mutations are staged on a copy
//! and only become visible once the file write succeeds.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::{IssueError, Result};
use crate::jsonl;
use crate::model::Issue;
use crate::query::{Filter, IssuePatch};

/// Persistence collaborator, partitioned by project name.
pub trait IssueStore: Send + Sync {
    /// Insert a new issue and return it with its assigned `_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    fn insert(&self, project: &str, issue: Issue) -> Result<Issue>;

    /// Return the project's issues matching `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    fn find(&self, project: &str, filter: &Filter) -> Result<Vec<Issue>>;

    /// Look up one issue by `_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails.
    fn find_by_id(&self, project: &str, id: &str) -> Result<Option<Issue>>;

    /// Apply `patch` to the issue with `_id`, returning the stored result,
    /// or `None` if no such issue exists in the project.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read-modify-write fails.
    fn update_by_id(&self, project: &str, id: &str, patch: &IssuePatch) -> Result<Option<Issue>>;

    /// Remove the issue with `_id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    fn delete_by_id(&self, project: &str, id: &str) -> Result<bool>;
}

impl<T: IssueStore + ?Sized> IssueStore for Box<T> {
    fn insert(&self, project: &str, issue: Issue) -> Result<Issue> {
        (**self).insert(project, issue)
    }

    fn find(&self, project: &str, filter: &Filter) -> Result<Vec<Issue>> {
        (**self).find(project, filter)
    }

    fn find_by_id(&self, project: &str, id: &str) -> Result<Option<Issue>> {
        (**self).find_by_id(project, id)
    }

    fn update_by_id(&self, project: &str, id: &str, patch: &IssuePatch) -> Result<Option<Issue>> {
        (**self).update_by_id(project, id, patch)
    }

    fn delete_by_id(&self, project: &str, id: &str) -> Result<bool> {
        (**self).delete_by_id(project, id)
    }
}

impl<T: IssueStore + ?Sized> IssueStore for Arc<T> {
    fn insert(&self, project: &str, issue: Issue) -> Result<Issue> {
        (**self).insert(project, issue)
    }

    fn find(&self, project: &str, filter: &Filter) -> Result<Vec<Issue>> {
        (**self).find(project, filter)
    }

    fn find_by_id(&self, project: &str, id: &str) -> Result<Option<Issue>> {
        (**self).find_by_id(project, id)
    }

    fn update_by_id(&self, project: &str, id: &str, patch: &IssuePatch) -> Result<Option<Issue>> {
        (**self).update_by_id(project, id, patch)
    }

    fn delete_by_id(&self, project: &str, id: &str) -> Result<bool> {
        (**self).delete_by_id(project, id)
    }
}

#[derive(Default, Clone)]
struct Inner {
    projects: HashMap<String, Vec<Issue>>,
    /// Project names in first-seen order, for stable JSONL output.
    project_order: Vec<String>,
    /// Every id ever handed out, so deleted ids are never reused.
    issued_ids: HashSet<String>,
}

impl Inner {
    fn project_mut(&mut self, project: &str) -> &mut Vec<Issue> {
        if !self.projects.contains_key(project) {
            self.project_order.push(project.to_string());
        }
        self.projects.entry(project.to_string()).or_default()
    }

    fn records(&self) -> impl Iterator<Item = (&str, &Issue)> {
        self.project_order.iter().flat_map(move |name| {
            self.projects
                .get(name)
                .into_iter()
                .flatten()
                .map(move |issue| (name.as_str(), issue))
        })
    }
}

/// In-memory issue store.
///
/// All data lives in memory behind a `RwLock`. A store created with
/// [`InMemoryStore::open`] writes every successful mutation back to its
/// JSONL file before returning.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
    jsonl_path: Option<PathBuf>,
}

impl InMemoryStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new empty store with no backing file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and load from a JSONL file. A missing file is an empty store;
    /// it is created on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let records = match jsonl::load(path) {
            Ok(records) => records,
            Err(IssueError::FileNotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        let mut inner = Inner::default();
        for record in records {
            inner.issued_ids.insert(record.issue.id.clone());
            inner.project_mut(&record.project).push(record.issue);
        }

        Ok(Self {
            inner: RwLock::new(inner),
            jsonl_path: Some(path.to_path_buf()),
        })
    }

    /// Total number of issues across all projects.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.projects.values().map(Vec::len).sum())
    }

    /// True if no project holds any issue.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| IssueError::storage("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| IssueError::storage("store lock poisoned"))
    }

    /// Persist `staged`, then make it the live state. On a failed write the
    /// live state is left untouched.
    fn commit(&self, inner: &mut Inner, staged: Inner) -> Result<()> {
        if let Some(ref path) = self.jsonl_path {
            jsonl::save(path, staged.records())?;
        }
        *inner = staged;
        Ok(())
    }
}

impl IssueStore for InMemoryStore {
    fn insert(&self, project: &str, mut issue: Issue) -> Result<Issue> {
        let mut inner = self.write()?;

        let id = crate::util::generate_id(
            project,
            &issue.issue_title,
            &issue.created_by,
            Utc::now(),
            |candidate| inner.issued_ids.contains(candidate),
        );
        issue.id.clone_from(&id);

        let mut staged = Inner::clone(&inner);
        staged.issued_ids.insert(id);
        staged.project_mut(project).push(issue.clone());
        self.commit(&mut inner, staged)?;

        tracing::debug!(project, id = %issue.id, "inserted issue");
        Ok(issue)
    }

    fn find(&self, project: &str, filter: &Filter) -> Result<Vec<Issue>> {
        let inner = self.read()?;
        Ok(inner
            .projects
            .get(project)
            .map(|issues| {
                issues
                    .iter()
                    .filter(|issue| filter.matches(issue))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn find_by_id(&self, project: &str, id: &str) -> Result<Option<Issue>> {
        let inner = self.read()?;
        Ok(inner
            .projects
            .get(project)
            .and_then(|issues| issues.iter().find(|issue| issue.id == id))
            .cloned())
    }

    fn update_by_id(&self, project: &str, id: &str, patch: &IssuePatch) -> Result<Option<Issue>> {
        let mut inner = self.write()?;

        let mut staged = Inner::clone(&inner);
        let Some(issue) = staged
            .projects
            .get_mut(project)
            .and_then(|issues| issues.iter_mut().find(|issue| issue.id == id))
        else {
            return Ok(None);
        };
        patch.apply_to(issue);
        let updated = issue.clone();

        self.commit(&mut inner, staged)?;

        tracing::debug!(project, id, "updated issue");
        Ok(Some(updated))
    }

    fn delete_by_id(&self, project: &str, id: &str) -> Result<bool> {
        let mut inner = self.write()?;

        let Some(position) = inner
            .projects
            .get(project)
            .and_then(|issues| issues.iter().position(|issue| issue.id == id))
        else {
            return Ok(false);
        };

        let mut staged = Inner::clone(&inner);
        if let Some(issues) = staged.projects.get_mut(project) {
            issues.remove(position);
        }

        self.commit(&mut inner, staged)?;

        tracing::debug!(project, id, "deleted issue");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_issue(title: &str) -> Issue {
        Issue::new(title, "text", "tester", Utc::now())
    }

    #[test]
    fn test_insert_assigns_id() {
        let store = InMemoryStore::new();
        let created = store.insert("p", make_issue("Test issue")).unwrap();
        assert!(crate::util::is_valid_id(&created.id));

        let fetched = store.find_by_id("p", &created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_ids_unique_for_identical_inputs() {
        let store = InMemoryStore::new();
        let a = store.insert("p", make_issue("Same")).unwrap();
        let b = store.insert("p", make_issue("Same")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_find_keeps_insertion_order() {
        let store = InMemoryStore::new();
        for title in ["first", "second", "third"] {
            store.insert("p", make_issue(title)).unwrap();
        }
        let titles: Vec<String> = store
            .find("p", &Filter::all())
            .unwrap()
            .into_iter()
            .map(|i| i.issue_title)
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn test_projects_are_isolated() {
        let store = InMemoryStore::new();
        let a = store.insert("alpha", make_issue("A")).unwrap();
        store.insert("beta", make_issue("B")).unwrap();

        assert_eq!(store.find("alpha", &Filter::all()).unwrap().len(), 1);
        assert!(store.find_by_id("beta", &a.id).unwrap().is_none());
        assert!(!store.delete_by_id("beta", &a.id).unwrap());
        assert!(store.find("gamma", &Filter::all()).unwrap().is_empty());
    }

    #[test]
    fn test_update_nonexistent() {
        let store = InMemoryStore::new();
        let patch = IssuePatch {
            status_text: Some("x".to_string()),
            ..Default::default()
        };
        assert!(store.update_by_id("p", "nope", &patch).unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete() {
        let store = InMemoryStore::new();
        let created = store.insert("p", make_issue("Original")).unwrap();

        let patch = IssuePatch {
            issue_title: Some("Updated".to_string()),
            ..Default::default()
        };
        let updated = store.update_by_id("p", &created.id, &patch).unwrap().unwrap();
        assert_eq!(updated.issue_title, "Updated");
        assert!(updated.updated_on > created.updated_on);
        assert_eq!(updated.created_on, created.created_on);

        assert!(store.delete_by_id("p", &created.id).unwrap());
        assert!(store.find_by_id("p", &created.id).unwrap().is_none());
        assert!(!store.delete_by_id("p", &created.id).unwrap());
    }

    #[test]
    fn test_write_through_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.jsonl");

        let (kept, removed) = {
            let store = InMemoryStore::open(&path).unwrap();
            assert!(store.is_empty().unwrap());
            let kept = store.insert("alpha", make_issue("Keep")).unwrap();
            let removed = store.insert("beta", make_issue("Drop")).unwrap();
            store.delete_by_id("beta", &removed.id).unwrap();
            (kept, removed)
        };

        let reopened = InMemoryStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        assert_eq!(reopened.find_by_id("alpha", &kept.id).unwrap(), Some(kept));
        assert!(reopened.find_by_id("beta", &removed.id).unwrap().is_none());
    }

    #[test]
    fn test_failed_write_leaves_insert_invisible() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryStore::open(dir.path().join("missing").join("issues.jsonl")).unwrap();

        assert!(store.insert("p", make_issue("Lost")).is_err());
        assert!(store.find("p", &Filter::all()).unwrap().is_empty());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_failed_write_keeps_update_and_delete_unapplied() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let store = InMemoryStore::open(sub.join("issues.jsonl")).unwrap();
        let created = store.insert("p", make_issue("Original")).unwrap();

        std::fs::remove_dir_all(&sub).unwrap();

        let patch = IssuePatch {
            issue_title: Some("Changed".to_string()),
            ..Default::default()
        };
        assert!(store.update_by_id("p", &created.id, &patch).is_err());
        assert_eq!(store.find_by_id("p", &created.id).unwrap(), Some(created.clone()));

        assert!(store.delete_by_id("p", &created.id).is_err());
        assert_eq!(store.find("p", &Filter::all()).unwrap(), vec![created]);
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store.insert("p", make_issue(&format!("issue {n}"))).unwrap()
                })
            })
            .collect();
        let ids: HashSet<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().id)
            .collect();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.len().unwrap(), 8);
    }
}
