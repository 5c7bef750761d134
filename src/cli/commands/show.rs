//! Show command implementation.

use issues_core::Response;
use issues_core::dispatch::respond;

use crate::cli::ShowArgs;
use crate::config::StorageContext;
use crate::error::Result;

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the lookup fails. An unknown id is reported in the
/// response body as `could not find`.
pub fn execute(args: &ShowArgs, ctx: &StorageContext) -> Result<Response> {
    let outcome = ctx
        .service
        .get(&args.project, &args.id)
        .and_then(|issue| Ok(serde_json::to_value(issue)?));
    Ok(respond(outcome, ctx.config.status_mode())?)
}
