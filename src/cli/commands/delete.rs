use issues_core::{FieldMap, Method, Response, dispatch::dispatch, model};
use serde_json::Value;

use crate::cli::DeleteArgs;
use crate::config::StorageContext;
use crate::error::Result;

/// Execute the delete command.
///
/// # Errors
///
/// Returns an error if the store write fails.
pub fn execute(args: &DeleteArgs, ctx: &StorageContext) -> Result<Response> {
    let mut fields = FieldMap::new();
    if let Some(ref id) = args.id {
        fields.insert(model::ID.to_string(), Value::String(id.clone()));
    }
    let response = dispatch(
        &ctx.service,
        Method::Delete,
        &args.project,
        &fields,
        ctx.config.status_mode(),
    )?;
    Ok(response)
}
