//! Text formatting functions for `issue_tracker`.
//!
//! Plain text (non-ANSI) formatting for terminal output:
//! - Status icons (○ ✓)
//! - Issue line formatting
//! - Multi-line issue details

use std::fmt::Write as _;

use chrono::SecondsFormat;
use issues_core::Issue;

/// Status icon characters.
pub mod icons {
    /// Open issue (hollow circle).
    pub const OPEN: &str = "○";
    /// Closed issue (checkmark).
    pub const CLOSED: &str = "✓";
}

/// Return the icon character for an issue's open flag.
#[must_use]
pub const fn format_status_icon(open: bool) -> &'static str {
    if open { icons::OPEN } else { icons::CLOSED }
}

/// Format a single-line issue summary.
///
/// Format: `{icon} {id} {title}`, followed by ` @{assigned_to}` and
/// ` ({status_text})` when those are set.
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    let mut line = format!(
        "{} {} {}",
        format_status_icon(issue.open),
        issue.id,
        issue.issue_title
    );
    if !issue.assigned_to.is_empty() {
        let _ = write!(line, " @{}", issue.assigned_to);
    }
    if !issue.status_text.is_empty() {
        let _ = write!(line, " ({})", issue.status_text);
    }
    line
}

/// Format every attribute of an issue for `show`.
#[must_use]
pub fn format_issue_details(issue: &Issue) -> String {
    let mut out = format!("{}\n", format_issue_line(issue));
    let state = if issue.open { "open" } else { "closed" };
    let _ = writeln!(out, "Status:      {state}");
    if !issue.status_text.is_empty() {
        let _ = writeln!(out, "Status text: {}", issue.status_text);
    }
    let _ = writeln!(out, "Created by:  {}", issue.created_by);
    if !issue.assigned_to.is_empty() {
        let _ = writeln!(out, "Assigned to: {}", issue.assigned_to);
    }
    let _ = writeln!(
        out,
        "Created:     {}",
        issue.created_on.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = writeln!(
        out,
        "Updated:     {}",
        issue.updated_on.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let _ = write!(out, "\n{}", issue.issue_text);
    out
}
