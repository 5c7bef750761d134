//! Command implementations.
//!
//! Every issue command builds a field map from its arguments and routes it
//! through [`issues_core::dispatch`], so the CLI answers exactly what any
//! other client of the service would receive.

pub mod create;
pub mod delete;
pub mod doctor;
pub mod init;
pub mod list;
pub mod request;
pub mod show;
pub mod update;

use issues_core::FieldMap;
use issues_core::model;
use serde_json::Value;

use crate::cli::IssueFieldArgs;
use crate::error::{Result, TrackerError};

/// Collect the attribute flags that were given into a field map.
pub fn field_map(id: Option<&str>, args: &IssueFieldArgs) -> FieldMap {
    let mut fields = FieldMap::new();
    let pairs = [
        (model::ID, id),
        (model::ISSUE_TITLE, args.title.as_deref()),
        (model::ISSUE_TEXT, args.text.as_deref()),
        (model::CREATED_BY, args.created_by.as_deref()),
        (model::ASSIGNED_TO, args.assigned_to.as_deref()),
        (model::STATUS_TEXT, args.status_text.as_deref()),
        (model::OPEN, args.open.as_deref()),
    ];
    for (key, value) in pairs {
        if let Some(value) = value {
            fields.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    fields
}

/// Parse repeated `KEY=VALUE` arguments into filter criteria.
///
/// Values stay strings; string criteria also match boolean attributes, so
/// `open=false` selects closed issues.
///
/// # Errors
///
/// Returns `Validation` if an argument has no `=` or an empty key.
pub fn parse_filters(args: &[String]) -> Result<FieldMap> {
    let mut filters = FieldMap::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| TrackerError::validation("filter", format!("expected KEY=VALUE, got '{arg}'")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(TrackerError::validation("filter", format!("empty key in '{arg}'")));
        }
        filters.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(filters)
}
