//! List command implementation.
//!
//! Every `--where KEY=VALUE` becomes one equality criterion; all must match.

use issues_core::{Method, Response, dispatch::dispatch};

use super::parse_filters;
use crate::cli::ListArgs;
use crate::config::StorageContext;
use crate::error::Result;

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if a filter is malformed or the query fails.
pub fn execute(args: &ListArgs, ctx: &StorageContext) -> Result<Response> {
    let filters = parse_filters(&args.filters)?;
    tracing::debug!(project = %args.project, filters = filters.len(), "listing issues");
    let response = dispatch(
        &ctx.service,
        Method::Get,
        &args.project,
        &filters,
        ctx.config.status_mode(),
    )?;
    Ok(response)
}
