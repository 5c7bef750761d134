use issues_core::{Method, Response, dispatch::dispatch};

use super::field_map;
use crate::cli::CreateArgs;
use crate::config::StorageContext;
use crate::error::Result;

/// Execute the create command.
///
/// # Errors
///
/// Returns an error if the store write fails. Missing required fields are
/// reported in the response body.
pub fn execute(args: &CreateArgs, ctx: &StorageContext) -> Result<Response> {
    let fields = field_map(None, &args.fields);
    let response = dispatch(
        &ctx.service,
        Method::Post,
        &args.project,
        &fields,
        ctx.config.status_mode(),
    )?;
    Ok(response)
}
