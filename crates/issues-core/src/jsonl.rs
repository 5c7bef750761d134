//! JSONL file I/O for issue records.
//!
//! Each line is one issue tagged with the project it belongs to:
//! `{"project": "...", "issue": {...}}`. Line order is insertion order.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IssueError, Result};
use crate::model::Issue;

/// One line of the JSONL file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectIssue {
    pub project: String,
    pub issue: Issue,
}

/// Load every record from a JSONL file.
///
/// # Errors
///
/// Returns `FileNotFound` if the file is missing, `Io` if it cannot be read,
/// or `JsonlParse` if any line is invalid.
pub fn load(path: &Path) -> Result<Vec<ProjectIssue>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IssueError::FileNotFound(path.to_path_buf())
        } else {
            IssueError::Io(e)
        }
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: ProjectIssue =
            serde_json::from_str(trimmed).map_err(|e| IssueError::JsonlParse {
                line: line_num + 1,
                reason: e.to_string(),
            })?;
        records.push(record);
    }

    tracing::debug!("Loaded {} issue(s) from {}", records.len(), path.display());
    Ok(records)
}

/// Save records to a JSONL file with atomic write.
///
/// Uses write-to-temp + rename so a crash never leaves a half-written file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save<'a, I>(path: &Path, records: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a str, &'a Issue)>,
{
    #[derive(Serialize)]
    struct Line<'a> {
        project: &'a str,
        issue: &'a Issue,
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = fs::File::create(&tmp_path)?;

    let mut count = 0usize;
    for (project, issue) in records {
        let json = serde_json::to_string(&Line { project, issue })?;
        writeln!(file, "{json}")?;
        count += 1;
    }

    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    tracing::debug!("Saved {} issue(s) to {}", count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_issue(id: &str) -> Issue {
        let mut issue = Issue::new("Test issue", "text", "tester", Utc::now());
        issue.id = id.to_string();
        issue
    }

    #[test]
    fn test_save_then_load_keeps_order_and_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.jsonl");

        let first = make_issue("aaaaaaaaaaaaaaaaaaaaaaaa");
        let second = make_issue("bbbbbbbbbbbbbbbbbbbbbbbb");
        save(&path, [("alpha", &first), ("beta", &second)]).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].project, "alpha");
        assert_eq!(loaded[0].issue, first);
        assert_eq!(loaded[1].project, "beta");
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("/nonexistent/issues.jsonl"));
        assert!(matches!(result, Err(IssueError::FileNotFound(_))));
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blanks.jsonl");
        let record = ProjectIssue {
            project: "p".to_string(),
            issue: make_issue("cccccccccccccccccccccccc"),
        };
        let json = serde_json::to_string(&record).unwrap();
        fs::write(&path, format!("\n{json}\n\n")).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, vec![record]);
    }

    #[test]
    fn test_load_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{not json}\n").unwrap();

        let result = load(&path);
        assert!(matches!(result, Err(IssueError::JsonlParse { line: 1, .. })));
    }
}
