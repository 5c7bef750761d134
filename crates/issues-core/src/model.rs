//! Core data types for issues-core.
//!
//! The serde field names are the wire names, so an `Issue` serialized by
//! any store or transport looks the same.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded request payload: attribute name to value.
pub type FieldMap = Map<String, Value>;

pub const ID: &str = "_id";
pub const ISSUE_TITLE: &str = "issue_title";
pub const ISSUE_TEXT: &str = "issue_text";
pub const CREATED_BY: &str = "created_by";
pub const ASSIGNED_TO: &str = "assigned_to";
pub const STATUS_TEXT: &str = "status_text";
pub const OPEN: &str = "open";
pub const CREATED_ON: &str = "created_on";
pub const UPDATED_ON: &str = "updated_on";

/// Fields that must be present and non-empty on create.
pub const REQUIRED_FIELDS: [&str; 3] = [ISSUE_TITLE, ISSUE_TEXT, CREATED_BY];

/// Fields an update may change.
pub const UPDATABLE_FIELDS: [&str; 6] = [
    ISSUE_TITLE,
    ISSUE_TEXT,
    CREATED_BY,
    ASSIGNED_TO,
    STATUS_TEXT,
    OPEN,
];

/// One tracked record within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Store-assigned identifier (24 lowercase hex digits).
    #[serde(rename = "_id")]
    pub id: String,

    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,

    #[serde(default)]
    pub assigned_to: String,

    #[serde(default)]
    pub status_text: String,

    #[serde(default = "default_open")]
    pub open: bool,

    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

const fn default_open() -> bool {
    true
}

impl Issue {
    /// Build a fresh, not yet stored issue with both timestamps set to `now`.
    #[must_use]
    pub fn new(
        issue_title: impl Into<String>,
        issue_text: impl Into<String>,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            issue_title: issue_title.into(),
            issue_text: issue_text.into(),
            created_by: created_by.into(),
            assigned_to: String::new(),
            status_text: String::new(),
            open: true,
            created_on: now,
            updated_on: now,
        }
    }

    /// Serialized key/value view used for filtering.
    #[must_use]
    pub fn to_fields(&self) -> FieldMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => FieldMap::new(),
        }
    }
}

/// Read a text value from a payload.
///
/// Strings are returned as-is; numbers and booleans use their JSON text.
/// `null`, arrays, objects and blank strings count as absent.
#[must_use]
pub fn text_field(fields: &FieldMap, key: &str) -> Option<String> {
    let text = match fields.get(key)? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Read a boolean value from a payload.
///
/// Accepts JSON booleans and the strings `"true"` / `"false"`
/// (case-insensitive, surrounding whitespace ignored).
#[must_use]
pub fn bool_field(fields: &FieldMap, key: &str) -> Option<bool> {
    match fields.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn issue_serializes_with_wire_names() {
        let mut issue = Issue::new("Title", "text", "Test", Utc::now());
        issue.id = "0123456789abcdef01234567".to_string();
        let map = issue.to_fields();

        assert_eq!(map.len(), 9);
        assert_eq!(map[ID], json!("0123456789abcdef01234567"));
        assert_eq!(map[OPEN], json!(true));
        assert_eq!(map[ASSIGNED_TO], json!(""));
        assert!(map[CREATED_ON].is_string());
    }

    #[test]
    fn deserialize_fills_defaults() {
        let now = Utc::now();
        let issue: Issue = serde_json::from_value(json!({
            "_id": "abc",
            "issue_title": "t",
            "issue_text": "x",
            "created_by": "me",
            "created_on": now,
            "updated_on": now,
        }))
        .unwrap();
        assert!(issue.open);
        assert!(issue.status_text.is_empty());
    }

    #[test]
    fn text_field_treats_blank_as_absent() {
        let map = fields(json!({"a": "  ", "b": "x", "c": null, "d": 3}));
        assert_eq!(text_field(&map, "a"), None);
        assert_eq!(text_field(&map, "b").as_deref(), Some("x"));
        assert_eq!(text_field(&map, "c"), None);
        assert_eq!(text_field(&map, "d").as_deref(), Some("3"));
        assert_eq!(text_field(&map, "missing"), None);
    }

    #[test]
    fn bool_field_accepts_strings() {
        let map = fields(json!({"a": "false", "b": true, "c": "maybe", "d": " TRUE "}));
        assert_eq!(bool_field(&map, "a"), Some(false));
        assert_eq!(bool_field(&map, "b"), Some(true));
        assert_eq!(bool_field(&map, "c"), None);
        assert_eq!(bool_field(&map, "d"), Some(true));
    }
}
