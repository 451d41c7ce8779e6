//! `kb show`: full details of one work item.

use crate::cmd::{assignee_label, join_tags, open_repository};
use crate::output::{OutputMode, pretty_kv, pretty_section, refused, render_mode, store_failure};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use kanban_core::dto::WorkItemDetails;
use kanban_core::model::WorkItemId;
use kanban_core::response::Response;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: i64,
}

fn local_datetime(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn render_pretty(d: &WorkItemDetails, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, &format!("#{} {}", d.id, d.title))?;
    pretty_kv(w, "state", d.state.as_str())?;
    let assignee = d.assigned_to_name.as_deref().unwrap_or("unknown user");
    pretty_kv(w, "assigned to", format!("{assignee} (#{})", d.assigned_to_id))?;
    pretty_kv(w, "tags", join_tags(&d.tags))?;
    pretty_kv(w, "created", local_datetime(d.created))?;
    pretty_kv(w, "state changed", local_datetime(d.state_updated))?;
    if let Some(ref description) = d.description {
        writeln!(w)?;
        writeln!(w, "{description}")?;
    }
    Ok(())
}

fn render_text(d: &WorkItemDetails, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "id\t{}", d.id)?;
    writeln!(w, "title\t{}", d.title)?;
    writeln!(w, "state\t{}", d.state)?;
    writeln!(
        w,
        "assigned_to\t{}\t{}",
        d.assigned_to_id,
        assignee_label(d.assigned_to_name.as_deref())
    )?;
    writeln!(w, "tags\t{}", d.tags.join(","))?;
    writeln!(w, "created\t{}", d.created.to_rfc3339())?;
    writeln!(w, "state_updated\t{}", d.state_updated.to_rfc3339())?;
    if let Some(ref description) = d.description {
        writeln!(w, "description\t{description}")?;
    }
    Ok(())
}

/// Execute `kb show <id>`.
///
/// # Errors
///
/// Returns an error if the item does not exist or the store fails.
pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let repo = open_repository(output, project_root)?;
    let id = WorkItemId::new(args.id);

    let item = match repo.read(id) {
        Ok(Some(item)) => item,
        Ok(None) => return refused(output, Response::NotFound, format!("work item {id} not found")),
        Err(e) => return store_failure(output, e),
    };

    render_mode(output, &WorkItemDetails::from(&item), render_text, render_pretty)
}
