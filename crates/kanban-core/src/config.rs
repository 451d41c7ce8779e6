use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project directory holding config and the default database.
pub const PROJECT_DIR: &str = ".kanban";

/// Environment variable that overrides the configured database path.
pub const DB_ENV: &str = "KANBAN_DB";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database path, relative to the project root unless absolute.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

fn default_store_path() -> PathBuf {
    Path::new(PROJECT_DIR).join("kanban.sqlite3")
}

const fn default_busy_timeout_ms() -> u64 {
    5_000
}

#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("config.toml")
}

/// Load `.kanban/config.toml`, falling back to defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write `config` to `.kanban/config.toml`, creating the directory.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_project_config(project_root: &Path, config: &ProjectConfig) -> Result<PathBuf> {
    let path = config_path(project_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Resolve the database path: `KANBAN_DB` wins, then the configured path
/// joined onto the project root.
#[must_use]
pub fn resolve_store_path(project_root: &Path, config: &ProjectConfig) -> PathBuf {
    resolve_store_path_inner(project_root, config, env::var_os(DB_ENV).map(PathBuf::from))
}

fn resolve_store_path_inner(
    project_root: &Path,
    config: &ProjectConfig,
    env_override: Option<PathBuf>,
) -> PathBuf {
    let path = env_override.unwrap_or_else(|| config.store.path.clone());
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}
