use issues_core::{Issue, Response};
use serde_json::Value;

use super::text::{format_issue_details, format_issue_line};
use crate::error::Result;

/// What a successful response body holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// A single issue (create, show).
    Issue,
    /// An array of issues (list).
    IssueList,
    /// A `{"result": ...}` confirmation (update, delete).
    Confirmation,
}

/// Render a response for stdout.
///
/// JSON mode prints the body verbatim, errors included. Text mode returns
/// `None` for error responses; the caller reports those on stderr.
///
/// # Errors
///
/// Returns a JSON error if the body does not have the shape `view` expects.
pub fn render_response(response: &Response, view: View, json: bool) -> Result<Option<String>> {
    if json {
        return Ok(Some(serde_json::to_string_pretty(&response.body)?));
    }
    if response.is_error() {
        return Ok(None);
    }

    let text = match view {
        View::Issue => {
            let issue: Issue = serde_json::from_value(response.body.clone())?;
            format_issue_details(&issue)
        }
        View::IssueList => {
            let issues: Vec<Issue> = serde_json::from_value(response.body.clone())?;
            if issues.is_empty() {
                "No issues found.".to_string()
            } else {
                let mut lines: Vec<String> = issues.iter().map(format_issue_line).collect();
                lines.push(format!("\n{} issue(s)", issues.len()));
                lines.join("\n")
            }
        }
        View::Confirmation => response
            .body
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: Value) -> Response {
        Response { status: 200, body }
    }

    #[test]
    fn json_mode_prints_body_verbatim() {
        let resp = response(json!({"error": "missing _id"}));
        let out = render_response(&resp, View::Confirmation, true).unwrap().unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"error": "missing _id"}));
    }

    #[test]
    fn text_mode_leaves_errors_to_caller() {
        let resp = response(json!({"error": "could not delete"}));
        assert!(render_response(&resp, View::Confirmation, false).unwrap().is_none());
    }

    #[test]
    fn text_mode_confirmation() {
        let resp = response(json!({"result": "successfully deleted"}));
        let out = render_response(&resp, View::Confirmation, false).unwrap();
        assert_eq!(out.as_deref(), Some("successfully deleted"));
    }

    #[test]
    fn text_mode_empty_list() {
        let resp = response(json!([]));
        let out = render_response(&resp, View::IssueList, false).unwrap();
        assert_eq!(out.as_deref(), Some("No issues found."));
    }

    #[test]
    fn text_mode_rejects_wrong_shape() {
        let resp = response(json!({"result": "successfully updated"}));
        assert!(render_response(&resp, View::IssueList, false).is_err());
    }
}
