//! `issue_tracker` - Project-scoped issue tracker
//!
//! This crate provides the `issues` CLI on top of [`issues_core`], adding
//! the pieces a standalone tool needs around the service.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered configuration and workspace discovery
//! - [`storage`] - `SQLite` issue store
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - Tracing subscriber setup

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod storage;

pub use cli::run;
pub use error::{Result, TrackerError};
