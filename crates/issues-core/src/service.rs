//! The issue service: validation, defaulting and filtering rules in front
//! of an [`IssueStore`].
//!
//! The service is stateless. Each operation makes at most one store call,
//! so it is safe to share across threads whenever the store is.

use chrono::Utc;
use serde::Serialize;

use crate::error::{IssueError, Result};
use crate::model::{self, FieldMap, Issue};
use crate::query::{Filter, IssuePatch};
use crate::store::IssueStore;
use crate::util::is_valid_id;

/// Minimal success response for update and delete.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Confirmation {
    pub result: &'static str,
}

impl Confirmation {
    pub const UPDATED: Self = Self {
        result: "successfully updated",
    };
    pub const DELETED: Self = Self {
        result: "successfully deleted",
    };
}

/// Issue CRUD over an injected store.
#[derive(Debug, Clone)]
pub struct IssueService<S> {
    store: S,
}

impl<S: IssueStore> IssueService<S> {
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create an issue in `project`.
    ///
    /// `issue_title`, `issue_text` and `created_by` must be present and not
    /// blank. `assigned_to` and `status_text` default to `""`, `open` to `true`.
    ///
    /// # Errors
    ///
    /// Returns `RequiredFieldsMissing` without touching the store if a
    /// required field is absent, or a storage error if the insert fails.
    pub fn create(&self, project: &str, fields: &FieldMap) -> Result<Issue> {
        let missing: Vec<&'static str> = model::REQUIRED_FIELDS
            .into_iter()
            .filter(|key| model::text_field(fields, key).is_none())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(project, ?missing, "create rejected");
            return Err(IssueError::RequiredFieldsMissing { missing });
        }

        let required = |key: &str| model::text_field(fields, key).unwrap_or_default();
        let mut issue = Issue::new(
            required(model::ISSUE_TITLE),
            required(model::ISSUE_TEXT),
            required(model::CREATED_BY),
            Utc::now(),
        );
        if let Some(assigned_to) = model::text_field(fields, model::ASSIGNED_TO) {
            issue.assigned_to = assigned_to;
        }
        if let Some(status_text) = model::text_field(fields, model::STATUS_TEXT) {
            issue.status_text = status_text;
        }
        if let Some(open) = model::bool_field(fields, model::OPEN) {
            issue.open = open;
        }

        let created = self.store.insert(project, issue)?;
        tracing::info!(project, id = %created.id, "issue created");
        Ok(created)
    }

    /// List the issues of `project` matching every supplied filter.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the read fails. No match is not an error.
    pub fn list(&self, project: &str, filters: &FieldMap) -> Result<Vec<Issue>> {
        let filter = Filter::new(filters.clone());
        let issues = self.store.find(project, &filter)?;
        tracing::debug!(project, count = issues.len(), "issues listed");
        Ok(issues)
    }

    /// Fetch a single issue.
    ///
    /// # Errors
    ///
    /// Returns `CouldNotFind` if the id is malformed or unknown.
    pub fn get(&self, project: &str, id: &str) -> Result<Issue> {
        if !is_valid_id(id) {
            return Err(IssueError::CouldNotFind { id: id.to_string() });
        }
        self.store
            .find_by_id(project, id)?
            .ok_or_else(|| IssueError::CouldNotFind { id: id.to_string() })
    }

    /// Apply the supplied fields to an existing issue.
    ///
    /// Checks run in order, each short-circuiting the rest: missing `_id`,
    /// nothing to update, unknown or malformed `_id`.
    ///
    /// # Errors
    ///
    /// Returns `MissingId`, `NoUpdateFields`, `CouldNotUpdate`, or a storage error.
    pub fn update(&self, project: &str, fields: &FieldMap) -> Result<Confirmation> {
        let id = model::text_field(fields, model::ID).ok_or_else(|| {
            tracing::warn!(project, "update rejected: no _id");
            IssueError::MissingId
        })?;

        let patch = IssuePatch::from_fields(fields, Utc::now());
        if !patch.has_changes() {
            tracing::warn!(project, %id, "update rejected: nothing to change");
            return Err(IssueError::NoUpdateFields { id });
        }

        if !is_valid_id(&id) {
            tracing::warn!(project, %id, "update rejected: malformed _id");
            return Err(IssueError::CouldNotUpdate { id });
        }

        match self.store.update_by_id(project, &id, &patch)? {
            Some(_) => {
                tracing::info!(project, %id, "issue updated");
                Ok(Confirmation::UPDATED)
            }
            None => {
                tracing::warn!(project, %id, "update rejected: not found");
                Err(IssueError::CouldNotUpdate { id })
            }
        }
    }

    /// Remove an issue.
    ///
    /// # Errors
    ///
    /// Returns `MissingId`, `CouldNotDelete`, or a storage error.
    pub fn delete(&self, project: &str, fields: &FieldMap) -> Result<Confirmation> {
        let id = model::text_field(fields, model::ID).ok_or_else(|| {
            tracing::warn!(project, "delete rejected: no _id");
            IssueError::MissingId
        })?;

        if is_valid_id(&id) && self.store.delete_by_id(project, &id)? {
            tracing::info!(project, %id, "issue deleted");
            Ok(Confirmation::DELETED)
        } else {
            tracing::warn!(project, %id, "delete rejected: not found");
            Err(IssueError::CouldNotDelete { id })
        }
    }
}
