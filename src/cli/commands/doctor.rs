//! Doctor command implementation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use issues_core::jsonl::ProjectIssue;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

use crate::config::{self, Backend, CliOverrides, Config};
use crate::error::{Result, TrackerError};
use crate::storage::CURRENT_SCHEMA_VERSION;

const REQUIRED_COLUMNS: [&str; 10] = [
    "id",
    "project",
    "issue_title",
    "issue_text",
    "created_by",
    "assigned_to",
    "status_text",
    "open",
    "created_on",
    "updated_on",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    pub ok: bool,
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    fn new(checks: Vec<CheckResult>) -> Self {
        Self {
            ok: !has_error(&checks),
            checks,
        }
    }

    #[must_use]
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|check| check.name == name)
    }
}

fn push_check(
    checks: &mut Vec<CheckResult>,
    name: &str,
    status: CheckStatus,
    message: Option<String>,
    details: Option<serde_json::Value>,
) {
    checks.push(CheckResult {
        name: name.to_string(),
        status,
        message,
        details,
    });
}

fn has_error(checks: &[CheckResult]) -> bool {
    checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Error))
}

/// Print a report as JSON or one line per check.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_report(report: &DoctorReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("issues doctor");
    for check in &report.checks {
        let label = match check.status {
            CheckStatus::Ok => "OK",
            CheckStatus::Warn => "WARN",
            CheckStatus::Error => "ERROR",
        };
        if let Some(message) = &check.message {
            println!("{label} {}: {}", check.name, message);
        } else {
            println!("{label} {}", check.name);
        }
    }
    Ok(())
}

fn collect_table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

fn check_schema(conn: &Connection, checks: &mut Vec<CheckResult>) -> Result<()> {
    let version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version == CURRENT_SCHEMA_VERSION {
        push_check(checks, "schema.version", CheckStatus::Ok, None, None);
    } else {
        push_check(
            checks,
            "schema.version",
            CheckStatus::Error,
            Some(format!(
                "Schema version {version}, expected {CURRENT_SCHEMA_VERSION}"
            )),
            None,
        );
    }

    let columns = collect_table_columns(conn, "issues")?;
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|required| !columns.iter().any(|column| column == required))
        .collect();
    if missing.is_empty() {
        push_check(checks, "schema.columns", CheckStatus::Ok, None, None);
    } else {
        push_check(
            checks,
            "schema.columns",
            CheckStatus::Error,
            Some("Missing required columns".to_string()),
            Some(serde_json::json!({ "issues": missing })),
        );
    }
    Ok(())
}

fn check_integrity(conn: &Connection, checks: &mut Vec<CheckResult>) -> Result<()> {
    let result: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if result.trim().eq_ignore_ascii_case("ok") {
        push_check(
            checks,
            "sqlite.integrity_check",
            CheckStatus::Ok,
            None,
            None,
        );
    } else {
        push_check(
            checks,
            "sqlite.integrity_check",
            CheckStatus::Error,
            Some(result),
            None,
        );
    }
    Ok(())
}

fn check_sqlite(path: &Path, checks: &mut Vec<CheckResult>) -> Result<()> {
    match Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY) {
        Ok(conn) => {
            check_schema(&conn, checks)?;
            check_integrity(&conn, checks)?;
        }
        Err(err) => {
            push_check(
                checks,
                "db.open",
                CheckStatus::Error,
                Some(format!("Failed to open DB read-only: {err}")),
                Some(serde_json::json!({ "path": path.display().to_string() })),
            );
        }
    }
    Ok(())
}

fn check_jsonl(path: &Path, checks: &mut Vec<CheckResult>) -> Result<usize> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut total = 0usize;
    let mut invalid = Vec::new();
    let mut invalid_count = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        total += 1;
        if serde_json::from_str::<ProjectIssue>(trimmed).is_err() {
            invalid_count += 1;
            if invalid.len() < 10 {
                invalid.push(idx + 1);
            }
        }
    }

    if invalid.is_empty() {
        push_check(
            checks,
            "jsonl.parse",
            CheckStatus::Ok,
            Some(format!("Parsed {total} records")),
            Some(serde_json::json!({
                "path": path.display().to_string(),
                "records": total
            })),
        );
    } else {
        push_check(
            checks,
            "jsonl.parse",
            CheckStatus::Error,
            Some(format!(
                "Malformed JSONL lines: {invalid_count} (first: {invalid:?})"
            )),
            Some(serde_json::json!({
                "path": path.display().to_string(),
                "records": total,
                "invalid_lines": invalid,
                "invalid_count": invalid_count
            })),
        );
    }

    Ok(total)
}

/// Execute the doctor command, discovering the workspace from `start`.
///
/// Problems found in the workspace become checks in the report; only
/// unexpected I/O or database failures are returned as errors.
///
/// # Errors
///
/// Returns an error if a check itself cannot run.
pub fn execute(start: Option<&Path>, overrides: &CliOverrides) -> Result<DoctorReport> {
    let mut checks = Vec::new();

    let issues_dir = match config::discover_issues_dir(start) {
        Ok(dir) => dir,
        Err(TrackerError::NotInitialized) => {
            push_check(
                &mut checks,
                "workspace",
                CheckStatus::Error,
                Some("Missing .issues directory (run `issues init`)".to_string()),
                None,
            );
            return Ok(DoctorReport::new(checks));
        }
        Err(err) => return Err(err),
    };
    push_check(
        &mut checks,
        "workspace",
        CheckStatus::Ok,
        Some(issues_dir.display().to_string()),
        None,
    );

    let config = match config::resolve(&issues_dir, overrides) {
        Ok(config) => {
            push_check(
                &mut checks,
                "config",
                CheckStatus::Ok,
                Some(format!("backend {}", config.backend.as_str())),
                None,
            );
            config
        }
        Err(err) => {
            push_check(
                &mut checks,
                "config",
                CheckStatus::Error,
                Some(err.to_string()),
                None,
            );
            Config::default()
        }
    };

    let store_path = issues_dir.join(config.backend.file_name());
    if !store_path.exists() {
        push_check(
            &mut checks,
            "store.exists",
            CheckStatus::Error,
            Some(format!("Missing {}", store_path.display())),
            None,
        );
    }

    let jsonl_path = issues_dir.join(Backend::Jsonl.file_name());
    if jsonl_path.exists() {
        if let Err(err) = check_jsonl(&jsonl_path, &mut checks) {
            push_check(
                &mut checks,
                "jsonl.parse",
                CheckStatus::Error,
                Some(format!("Failed to read JSONL: {err}")),
                Some(serde_json::json!({ "path": jsonl_path.display().to_string() })),
            );
        }
    } else if config.backend == Backend::Jsonl {
        push_check(
            &mut checks,
            "jsonl.parse",
            CheckStatus::Warn,
            Some("No JSONL file found".to_string()),
            None,
        );
    }

    let db_path = issues_dir.join(Backend::Sqlite.file_name());
    if db_path.exists() {
        check_sqlite(&db_path, &mut checks)?;
    }

    Ok(DoctorReport::new(checks))
}
