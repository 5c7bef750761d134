//! `SQLite` storage layer for `issue_tracker`.
//!
//! Provides [`SqliteStore`], an [`IssueStore`](issues_core::IssueStore)
//! backed by a single database file with:
//! - WAL mode for concurrent readers
//! - One transaction per read-modify-write
//! - A `project` column partitioning the issues table
//!
//! # Submodules
//!
//! - [`schema`] - Table definitions and schema versioning
//! - [`sqlite`] - The store itself

pub mod schema;
pub mod sqlite;

pub use schema::{CURRENT_SCHEMA_VERSION, apply_schema};
pub use sqlite::SqliteStore;
