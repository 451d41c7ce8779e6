//! `kb update`: change fields of an existing work item.
//!
//! The repository replaces every field on update, so the command reads the
//! current item first and only overrides the flags that were given.

use crate::cmd::create::MutationResult;
use crate::cmd::{open_repository, parse_state};
use crate::output::{OutputMode, refused, store_failure};
use clap::Args;
use kanban_core::dto::WorkItemUpdate;
use kanban_core::model::{UserId, WorkItem, WorkItemId};
use kanban_core::response::Response;
use std::path::Path;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: i64,

    #[arg(short, long)]
    pub title: Option<String>,

    /// Reassign to this user id.
    #[arg(short = 'u', long = "user")]
    pub assigned_to: Option<i64>,

    #[arg(short, long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    #[arg(long)]
    pub clear_description: bool,

    /// Replace the tag set; repeat for several.
    #[arg(long = "tag", conflicts_with = "clear_tags")]
    pub tags: Vec<String>,

    /// Remove every tag from the item.
    #[arg(long)]
    pub clear_tags: bool,

    /// New state: new, active, resolved, closed, removed.
    #[arg(short, long)]
    pub state: Option<String>,
}

/// Execute `kb update`.
///
/// # Errors
///
/// Returns an error if the item does not exist, the assignee is unknown, the
/// state is invalid, or the store fails.
pub fn run_update(args: &UpdateArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let state = args
        .state
        .as_deref()
        .map(|raw| parse_state(output, raw))
        .transpose()?;

    let mut repo = open_repository(output, project_root)?;
    let id = WorkItemId::new(args.id);

    let current = match repo.read(id) {
        Ok(Some(item)) => item,
        Ok(None) => return refused(output, Response::NotFound, format!("work item {id} not found")),
        Err(e) => return store_failure(output, e),
    };

    let mut request = apply_overrides(&current, args);
    if let Some(state) = state {
        request.state = state;
    }
    let assignee = request.assigned_to_id;

    match repo.update(request) {
        Ok(Response::Updated) => MutationResult {
            result: Response::Updated,
            id,
        }
        .render(output),
        Ok(Response::BadRequest) => {
            refused(output, Response::BadRequest, format!("user {assignee} does not exist"))
        }
        Ok(other) => refused(output, other, format!("work item {id} not found")),
        Err(e) => store_failure(output, e),
    }
}

fn apply_overrides(current: &WorkItem, args: &UpdateArgs) -> WorkItemUpdate {
    let mut request = WorkItemUpdate::from_item(current);

    if let Some(ref title) = args.title {
        request.title.clone_from(title);
    }
    if let Some(user) = args.assigned_to {
        request.assigned_to_id = UserId::new(user);
    }
    if args.clear_description {
        request.description = None;
    } else if let Some(ref description) = args.description {
        request.description = Some(description.clone());
    }
    if args.clear_tags {
        request.tags.clear();
    } else if !args.tags.is_empty() {
        request.tags.clone_from(&args.tags);
    }

    request
}
