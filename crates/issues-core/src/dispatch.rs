//! Transport-neutral request dispatch.
//!
//! Maps `(method, project, payload)` onto an [`IssueService`] call and
//! shapes the outcome the way clients expect it: the issue, the issue list,
//! a `{"result": ...}` confirmation, or an `{"error": ...}` body.
//!
//! By default every handled request reports status 200 and errors live in
//! the body only. [`StatusMode::Strict`] maps error kinds to 4xx codes
//! instead; bodies are identical in both modes. Storage failures are never
//! folded into a response; they come back as `Err`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::error::{ErrorKind, IssueError, Result};
use crate::model::FieldMap;
use crate::service::IssueService;
use crate::store::IssueStore;

/// Request verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// List issues.
    Get,
    /// Create an issue.
    Post,
    /// Update an issue.
    Put,
    /// Delete an issue.
    Delete,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A method name no operation answers to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported method")]
pub struct UnsupportedMethod(pub String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" | "PATCH" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// How outcomes map to status codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusMode {
    /// Every handled request is 200; errors are reported in the body.
    #[default]
    Compat,
    /// Validation errors are 400, missing records 404.
    Strict,
}

impl StatusMode {
    #[must_use]
    pub const fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Compat }
    }

    const fn status_for(self, kind: ErrorKind) -> u16 {
        match (self, kind) {
            (Self::Compat, _) => 200,
            (Self::Strict, ErrorKind::Validation) => 400,
            (Self::Strict, ErrorKind::NotFound) => 404,
            (Self::Strict, ErrorKind::Storage) => 500,
        }
    }
}

/// A status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: impl fmt::Display) -> Self {
        Self {
            status,
            body: json!({ "error": message.to_string() }),
        }
    }

    /// The `error` message, if this response reports one.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }
}

/// Route a request with an already-parsed method.
///
/// # Errors
///
/// Returns storage errors from the store; contract errors become responses.
pub fn dispatch<S: IssueStore>(
    service: &IssueService<S>,
    method: Method,
    project: &str,
    fields: &FieldMap,
    mode: StatusMode,
) -> Result<Response> {
    tracing::debug!(%method, project, "dispatching request");

    let outcome = match method {
        Method::Post => service
            .create(project, fields)
            .and_then(|issue| Ok(serde_json::to_value(issue)?)),
        Method::Get => service
            .list(project, fields)
            .and_then(|issues| Ok(serde_json::to_value(issues)?)),
        Method::Put => service
            .update(project, fields)
            .and_then(|done| Ok(serde_json::to_value(done)?)),
        Method::Delete => service
            .delete(project, fields)
            .and_then(|done| Ok(serde_json::to_value(done)?)),
    };

    respond(outcome, mode)
}

/// Turn an operation outcome into a response.
///
/// Validation and not-found errors become `{"error": ...}` bodies with the
/// status `mode` assigns them.
///
/// # Errors
///
/// Storage errors are returned unchanged.
pub fn respond(outcome: Result<Value>, mode: StatusMode) -> Result<Response> {
    match outcome {
        Ok(body) => Ok(Response::ok(body)),
        Err(err) if err.is_client_error() => Ok(Response::error(mode.status_for(err.kind()), err)),
        Err(err) => Err(err),
    }
}

/// Route a request whose method is still a string.
///
/// Unknown methods answer `{"error": "unsupported method"}` (405 when strict).
///
/// # Errors
///
/// Returns storage errors from the store.
pub fn dispatch_raw<S: IssueStore>(
    service: &IssueService<S>,
    method: &str,
    project: &str,
    fields: &FieldMap,
    mode: StatusMode,
) -> Result<Response> {
    match method.parse::<Method>() {
        Ok(method) => dispatch(service, method, project, fields, mode),
        Err(err) => {
            let status = match mode {
                StatusMode::Compat => 200,
                StatusMode::Strict => 405,
            };
            Ok(Response::error(status, err))
        }
    }
}

/// Decode a request body into a field map. An empty body is an empty map.
///
/// # Errors
///
/// Returns `Json` if the body is not a JSON object.
pub fn parse_body(body: &str) -> Result<FieldMap> {
    if body.trim().is_empty() {
        return Ok(FieldMap::new());
    }
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        other => Err(IssueError::Json(serde::de::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}
