//! Output formatting for `issue_tracker`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//! JSON mode prints the response body exactly as a client would receive it.

mod output;
mod text;

pub use output::{View, render_response};
pub use text::{format_issue_details, format_issue_line, format_status_icon};
