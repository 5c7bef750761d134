#![allow(dead_code)]

pub mod cli;

use serde_json::Value;

/// Parse command stdout as JSON, naming the step on failure.
pub fn parse_json(stdout: &str, label: &str) -> Value {
    serde_json::from_str(stdout)
        .unwrap_or_else(|e| panic!("{label}: stdout is not JSON ({e}):\n{stdout}"))
}
