pub mod completions;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod show;
pub mod tags;
pub mod update;
pub mod user;

use crate::output::{CliError, OutputMode, fail};
use anyhow::Context as _;
use kanban_core::config::{self, load_project_config, resolve_store_path};
use kanban_core::error::ErrorCode;
use kanban_core::model::State;
use kanban_core::repository::WorkItemRepository;
use kanban_core::session::SqliteSession;
use std::path::Path;
use tracing::debug;

/// Open the project's store, refusing when it has not been initialized.
///
/// # Errors
///
/// Renders and returns an error if the config is malformed, the database is
/// missing, or opening it fails.
pub fn open_session(output: OutputMode, project_root: &Path) -> anyhow::Result<SqliteSession> {
    let project_config = match load_project_config(project_root) {
        Ok(c) => c,
        Err(e) => return fail(output, CliError::with_code(ErrorCode::ConfigParseError, format!("{e:#}"))),
    };

    let db_path = resolve_store_path(project_root, &project_config);
    if !db_path.exists() {
        return fail(
            output,
            CliError::with_code(
                ErrorCode::NotInitialized,
                format!("no store at {} (and no {} set)", db_path.display(), config::DB_ENV),
            ),
        );
    }

    debug!(path = %db_path.display(), "opening store");
    SqliteSession::open(&db_path, project_config.store.busy_timeout())
        .with_context(|| format!("open store {}", db_path.display()))
}

/// [`open_session`] wrapped in a repository.
///
/// # Errors
///
/// See [`open_session`].
pub fn open_repository(
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<WorkItemRepository<SqliteSession>> {
    open_session(output, project_root).map(WorkItemRepository::new)
}

/// Parse a `--state` value, rendering `E2004` on failure.
///
/// # Errors
///
/// Returns an error if `raw` is not one of the five states.
pub fn parse_state(output: OutputMode, raw: &str) -> anyhow::Result<State> {
    match raw.parse::<State>() {
        Ok(state) => Ok(state),
        Err(e) => fail(output, CliError::with_code(ErrorCode::InvalidEnumValue, e.to_string())),
    }
}

/// Comma-joined tag names, or `-` when there are none.
pub fn join_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

/// Assignee name, or `-` when the id names no stored user.
pub fn assignee_label(name: Option<&str>) -> &str {
    name.unwrap_or("-")
}
