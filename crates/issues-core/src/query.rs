//! Query and patch types for issue operations.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::model::{self, FieldMap, Issue};

/// Exact-match selection over an issue's serialized fields.
///
/// Every criterion must match (AND). A criterion naming an attribute the
/// issue does not have never matches. No criteria matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    criteria: FieldMap,
}

impl Filter {
    #[must_use]
    pub const fn new(criteria: FieldMap) -> Self {
        Self { criteria }
    }

    /// A filter selecting every issue.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter selecting the issue with the given `_id`.
    #[must_use]
    pub fn by_id(id: &str) -> Self {
        let mut criteria = FieldMap::new();
        criteria.insert(model::ID.to_string(), Value::String(id.to_string()));
        Self { criteria }
    }

    /// Add a criterion, replacing any previous one for the same key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.criteria.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Check an issue against every criterion.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        if self.criteria.is_empty() {
            return true;
        }
        let fields = issue.to_fields();
        self.criteria.iter().all(|(key, expected)| {
            fields
                .get(key)
                .is_some_and(|actual| values_equal(actual, expected))
        })
    }
}

/// Equality with one concession to string-typed transports: a string
/// criterion also matches a scalar with the same text. Boolean text is
/// read the way payloads read it (trimmed, case-insensitive).
fn values_equal(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Bool(b), Value::String(s)) => s.trim().eq_ignore_ascii_case(&b.to_string()),
        (Value::Number(n), Value::String(s)) => n.to_string() == s.trim(),
        _ => false,
    }
}

/// Fields to change on an existing issue.
///
/// `None` leaves the stored value alone. `updated_on` is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePatch {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
    pub updated_on: DateTime<Utc>,
}

impl Default for IssuePatch {
    fn default() -> Self {
        Self {
            issue_title: None,
            issue_text: None,
            created_by: None,
            assigned_to: None,
            status_text: None,
            open: None,
            updated_on: Utc::now(),
        }
    }
}

impl IssuePatch {
    /// Collect the updatable fields present in a payload.
    ///
    /// Blank text values and non-boolean `open` values are treated as absent.
    /// `_id`, timestamps and unknown keys are ignored.
    #[must_use]
    pub fn from_fields(fields: &FieldMap, now: DateTime<Utc>) -> Self {
        Self {
            issue_title: model::text_field(fields, model::ISSUE_TITLE),
            issue_text: model::text_field(fields, model::ISSUE_TEXT),
            created_by: model::text_field(fields, model::CREATED_BY),
            assigned_to: model::text_field(fields, model::ASSIGNED_TO),
            status_text: model::text_field(fields, model::STATUS_TEXT),
            open: model::bool_field(fields, model::OPEN),
            updated_on: now,
        }
    }

    /// True if the patch would change at least one attribute besides `updated_on`.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.issue_title.is_some()
            || self.issue_text.is_some()
            || self.created_by.is_some()
            || self.assigned_to.is_some()
            || self.status_text.is_some()
            || self.open.is_some()
    }

    /// Apply the patch in place.
    ///
    /// `updated_on` always moves forward: if the patch timestamp is not
    /// later than the stored one, the stored value is bumped by 1µs.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(ref title) = self.issue_title {
            issue.issue_title.clone_from(title);
        }
        if let Some(ref text) = self.issue_text {
            issue.issue_text.clone_from(text);
        }
        if let Some(ref created_by) = self.created_by {
            issue.created_by.clone_from(created_by);
        }
        if let Some(ref assigned_to) = self.assigned_to {
            issue.assigned_to.clone_from(assigned_to);
        }
        if let Some(ref status_text) = self.status_text {
            issue.status_text.clone_from(status_text);
        }
        if let Some(open) = self.open {
            issue.open = open;
        }

        issue.updated_on = if self.updated_on > issue.updated_on {
            self.updated_on
        } else {
            issue.updated_on + Duration::microseconds(1)
        };
    }
}
