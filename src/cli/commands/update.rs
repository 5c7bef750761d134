use issues_core::{Method, Response, dispatch::dispatch};

use super::field_map;
use crate::cli::UpdateArgs;
use crate::config::StorageContext;
use crate::error::Result;

/// Execute the update command.
///
/// # Errors
///
/// Returns an error if the store write fails.
pub fn execute(args: &UpdateArgs, ctx: &StorageContext) -> Result<Response> {
    let fields = field_map(args.id.as_deref(), &args.fields);
    let response = dispatch(
        &ctx.service,
        Method::Put,
        &args.project,
        &fields,
        ctx.config.status_mode(),
    )?;
    Ok(response)
}
