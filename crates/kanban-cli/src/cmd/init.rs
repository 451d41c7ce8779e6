//! `kb init`: create `.kanban/config.toml` and the store.

use crate::output::{CliError, OutputMode, fail, pretty_kv, render};
use anyhow::Context as _;
use clap::Args;
use kanban_core::config::{ProjectConfig, config_path, resolve_store_path, write_project_config};
use kanban_core::db::{self, migrations};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite the config even if `.kanban/config.toml` already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    config: String,
    database: String,
    schema_version: u32,
}

/// Execute `kb init`. Creates:
///
/// ```text
/// .kanban/
///   config.toml       (default store settings)
///   kanban.sqlite3    (migrated store, unless KANBAN_DB points elsewhere)
/// ```
///
/// Re-running with `--force` keeps existing data; migrations are idempotent.
///
/// # Errors
///
/// Returns an error if the project is already initialized without `--force`,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    if config_path(project_root).exists() && !args.force {
        return fail(
            output,
            CliError::new(".kanban/ already exists. Use `kb init --force` to reinitialize."),
        );
    }

    let project_config = ProjectConfig::default();
    let config_file = write_project_config(project_root, &project_config)?;

    let db_path = resolve_store_path(project_root, &project_config);
    let conn = db::open_store(&db_path, project_config.store.busy_timeout())
        .with_context(|| format!("create store {}", db_path.display()))?;
    let schema_version = migrations::current_schema_version(&conn)?;

    info!(path = %db_path.display(), schema_version, "project initialized");

    let report = InitReport {
        config: config_file.display().to_string(),
        database: db_path.display().to_string(),
        schema_version,
    };
    render(output, &report, |r, w| {
        writeln!(w, "Initialized kanban project")?;
        pretty_kv(w, "config", &r.config)?;
        pretty_kv(w, "database", &r.database)?;
        pretty_kv(w, "schema", r.schema_version.to_string())
    })
}
