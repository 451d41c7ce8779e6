//! `kb delete`: remove a work item that is not active.

use crate::cmd::create::MutationResult;
use crate::cmd::open_repository;
use crate::output::{OutputMode, refused, store_failure};
use clap::Args;
use kanban_core::model::WorkItemId;
use kanban_core::response::Response;
use std::path::Path;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: i64,
}

/// Execute `kb delete`.
///
/// # Errors
///
/// Returns an error if the item is missing, still active, or the store fails.
pub fn run_delete(args: &DeleteArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut repo = open_repository(output, project_root)?;
    let id = WorkItemId::new(args.id);

    match repo.delete(id) {
        Ok(Response::Deleted) => MutationResult {
            result: Response::Deleted,
            id,
        }
        .render(output),
        Ok(Response::Conflict) => refused(
            output,
            Response::Conflict,
            format!("work item {id} is active and cannot be deleted"),
        ),
        Ok(other) => refused(output, other, format!("work item {id} not found")),
        Err(e) => store_failure(output, e),
    }
}
