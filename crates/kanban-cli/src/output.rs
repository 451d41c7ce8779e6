//! Shared output layer for every `kb` command.
//!
//! Handlers receive an [`OutputMode`] and format accordingly: aligned
//! key/value blocks for humans, tab-separated rows for pipes, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / `--json` flag
//! 2. `KANBAN_FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use kanban_core::error::ErrorCode;
use kanban_core::response::Response;
use kanban_core::session::StoreError;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Environment variable consulted when no format flag is given.
pub const FORMAT_ENV: &str = "KANBAN_FORMAT";

/// Shared width for pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 60;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-oriented output with labels and separators.
    Pretty,
    /// Tab-separated rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }
    if json_flag {
        return OutputMode::Json;
    }

    match format_env.map(str::to_ascii_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        Some("text") => OutputMode::Text,
        Some("pretty") => OutputMode::Pretty,
        _ if is_tty => OutputMode::Pretty,
        _ => OutputMode::Text,
    }
}

/// Resolve the output mode from flags, `KANBAN_FORMAT`, and TTY detection.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var(FORMAT_ENV).ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Render a serializable value with distinct text and pretty renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a value whose text and pretty forms are the same.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
    } else {
        human_fn(value, &mut out)?;
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable `E####` code from [`ErrorCode`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// An error carrying `code` and its hint, with a caller-specific message.
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<ErrorCode> for CliError {
    fn from(code: ErrorCode) -> Self {
        Self::with_code(code, code.message())
    }
}

impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self::with_code(err.code(), err.to_string())
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    if mode.is_json() {
        let wrapper = serde_json::json!({ "error": error });
        serde_json::to_writer_pretty(&mut out, &wrapper)?;
        writeln!(out)?;
    } else {
        match error.error_code {
            Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
            None => writeln!(out, "error: {}", error.message)?,
        }
        if let Some(ref suggestion) = error.suggestion {
            writeln!(out, "  suggestion: {suggestion}")?;
        }
    }
    Ok(())
}

/// Render `error` and return it as the command's failure.
pub fn fail<T>(mode: OutputMode, error: CliError) -> anyhow::Result<T> {
    render_error(mode, &error)?;
    Err(anyhow::anyhow!(error.message))
}

/// Render a store failure and propagate it.
pub fn store_failure<T>(mode: OutputMode, err: StoreError) -> anyhow::Result<T> {
    render_error(mode, &CliError::from(&err))?;
    Err(err.into())
}

/// Render a refused repository outcome (`NotFound`, `Conflict`,
/// `BadRequest`) and return it as the command's failure.
pub fn refused<T>(mode: OutputMode, response: Response, message: impl Into<String>) -> anyhow::Result<T> {
    let code = response.error_code().unwrap_or(ErrorCode::InternalUnexpected);
    fail(mode, CliError::with_code(code, message))
}
