//! `kb list`: list work items, optionally filtered by one criterion.

use crate::cmd::{assignee_label, join_tags, open_repository, parse_state};
use crate::output::{OutputMode, pretty_section, render_mode, store_failure};
use clap::{ArgGroup, Args};
use kanban_core::dto::WorkItemSummary;
use kanban_core::model::UserId;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("filter").multiple(false)))]
pub struct ListArgs {
    /// Only items carrying this exact tag name.
    #[arg(long, group = "filter")]
    pub tag: Option<String>,

    /// Only items assigned to this user id.
    #[arg(short = 'u', long = "user", group = "filter")]
    pub user: Option<i64>,

    /// Only items in this state.
    #[arg(short, long, group = "filter")]
    pub state: Option<String>,
}

/// Execute `kb list`.
///
/// # Errors
///
/// Returns an error if the state filter is invalid or the store fails.
pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let state = args
        .state
        .as_deref()
        .map(|raw| parse_state(output, raw))
        .transpose()?;

    let repo = open_repository(output, project_root)?;

    let items = if let Some(ref tag) = args.tag {
        repo.read_all_by_tag(tag)
    } else if let Some(user) = args.user {
        repo.read_all_by_user(UserId::new(user))
    } else if let Some(state) = state {
        repo.read_all_by_state(state)
    } else {
        repo.read_all()
    };
    let items = match items {
        Ok(items) => items,
        Err(e) => return store_failure(output, e),
    };

    let rows: Vec<WorkItemSummary> = items.iter().map(WorkItemSummary::from).collect();
    render_mode(
        output,
        &rows,
        |rows, w| {
            for r in rows {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}\t{}",
                    r.id,
                    r.state,
                    r.title,
                    assignee_label(r.assigned_to_name.as_deref()),
                    r.tags.join(",")
                )?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, &format!("Work items ({})", rows.len()))?;
            for r in rows {
                writeln!(
                    w,
                    "{:>4}  {:<9} {:<30} {:<12} {}",
                    r.id,
                    r.state.as_str(),
                    r.title,
                    assignee_label(r.assigned_to_name.as_deref()),
                    join_tags(&r.tags)
                )?;
            }
            Ok(())
        },
    )
}
