//! Raw request command: a method name and a JSON body, answered the way
//! the service answers any client.

use std::io::{self, Read};

use issues_core::Response;
use issues_core::dispatch::{dispatch_raw, parse_body};

use crate::cli::RequestArgs;
use crate::config::StorageContext;
use crate::error::Result;

fn read_body(body: Option<&str>) -> Result<String> {
    match body {
        Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(text) => Ok(text.to_string()),
        None => Ok(String::new()),
    }
}

/// Execute the request command.
///
/// # Errors
///
/// Returns an error if the body is not a JSON object or the store fails.
pub fn execute(args: &RequestArgs, ctx: &StorageContext) -> Result<Response> {
    let body = read_body(args.body.as_deref())?;
    let fields = parse_body(&body)?;
    let response = dispatch_raw(
        &ctx.service,
        &args.method,
        &args.project,
        &fields,
        ctx.config.status_mode(),
    )?;
    tracing::info!(method = %args.method, project = %args.project, status = response.status, "request handled");
    Ok(response)
}
