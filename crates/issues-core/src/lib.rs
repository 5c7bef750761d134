//! `issues-core` - Project-scoped issue records.
//!
//! The rules for creating, listing, updating and deleting issues live in
//! [`IssueService`]; persistence sits behind the [`IssueStore`] trait.
//! [`dispatch`](dispatch::dispatch) turns a method + payload into the
//! response body clients see.
//!
//! # Quick Start
//!
//! ```
//! use issues_core::{FieldMap, InMemoryStore, IssueService};
//! use serde_json::json;
//!
//! let service = IssueService::new(InMemoryStore::new());
//!
//! let mut fields = FieldMap::new();
//! fields.insert("issue_title".into(), json!("Title"));
//! fields.insert("issue_text".into(), json!("text"));
//! fields.insert("created_by".into(), json!("Test"));
//!
//! let issue = service.create("apitest", &fields).unwrap();
//! assert!(issue.open);
//!
//! let open_issues = service.list("apitest", &FieldMap::new()).unwrap();
//! assert_eq!(open_issues.len(), 1);
//! ```

pub mod dispatch;
pub mod error;
pub mod jsonl;
pub mod model;
pub mod query;
pub mod service;
pub mod store;
pub mod util;

pub use dispatch::{Method, Response, StatusMode};
pub use error::{ErrorKind, IssueError, Result};
pub use model::{FieldMap, Issue};
pub use query::{Filter, IssuePatch};
pub use service::{Confirmation, IssueService};
pub use store::{InMemoryStore, IssueStore};
