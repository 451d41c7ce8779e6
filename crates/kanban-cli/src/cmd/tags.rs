//! `kb tags`: list every tag name in the store.

use crate::cmd::open_session;
use crate::output::{OutputMode, pretty_section, render_mode, store_failure};
use kanban_core::session::Session;
use std::io::Write;
use std::path::Path;

/// Execute `kb tags`. Tags are listed by name, including ones no longer
/// attached to any work item.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried.
pub fn run_tags(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let session = open_session(output, project_root)?;
    let tags = match session.tags() {
        Ok(tags) => tags,
        Err(e) => return store_failure(output, e),
    };

    render_mode(
        output,
        &tags,
        |tags, w| {
            for t in tags {
                writeln!(w, "{}\t{}", t.id, t.name)?;
            }
            Ok(())
        },
        |tags, w| {
            pretty_section(w, &format!("Tags ({})", tags.len()))?;
            for t in tags {
                writeln!(w, "{:>4}  {}", t.id, t.name)?;
            }
            Ok(())
        },
    )
}
