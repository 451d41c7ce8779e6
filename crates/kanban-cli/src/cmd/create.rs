//! `kb create`: add a work item in state `new`.

use crate::cmd::open_repository;
use crate::output::{OutputMode, render_mode, store_failure};
use clap::Args;
use kanban_core::dto::WorkItemCreate;
use kanban_core::model::{UserId, WorkItemId};
use kanban_core::response::Response;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub title: String,

    /// Id of the assigned user (see `kb user list`).
    #[arg(short = 'u', long = "user")]
    pub assigned_to: i64,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Tag name; repeat for several. Unknown names are created.
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Result line shared by the mutating commands.
#[derive(Debug, Serialize)]
pub struct MutationResult {
    pub result: Response,
    pub id: WorkItemId,
}

impl MutationResult {
    /// Render in the caller's mode: `<result>\t<id>` for text, a sentence
    /// for pretty.
    pub fn render(&self, output: OutputMode) -> anyhow::Result<()> {
        render_mode(
            output,
            self,
            |r, w| writeln!(w, "{}\t{}", r.result, r.id),
            |r, w| writeln!(w, "Work item {} {}", r.id, r.result),
        )
    }
}

/// Execute `kb create`.
///
/// The assignee id is not checked; an item may be created for a user that
/// has not been added yet.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the commit fails.
pub fn run_create(args: &CreateArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut repo = open_repository(output, project_root)?;

    let request = WorkItemCreate::new(
        args.title.as_str(),
        UserId::new(args.assigned_to),
        args.description.clone(),
        args.tags.iter().map(String::as_str),
    );

    match repo.create(request) {
        Ok((result, id)) => MutationResult { result, id }.render(output),
        Err(e) => store_failure(output, e),
    }
}
