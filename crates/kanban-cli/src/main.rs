#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about = "kb: a small kanban work item tracker", long_about = None)]
struct Cli {
    /// Enable debug logging unless KANBAN_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format; overrides KANBAN_FORMAT.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Setup",
        about = "Initialize a kanban project",
        long_about = "Create .kanban/config.toml and the SQLite store in the current directory.",
        after_help = "EXAMPLES:\n    kb init\n\n    # Keep the data somewhere else\n    KANBAN_DB=/tmp/board.sqlite3 kb init"
    )]
    Init(cmd::init::InitArgs),

    #[command(next_help_heading = "Setup", about = "Manage users")]
    User {
        #[command(subcommand)]
        command: cmd::user::UserCommand,
    },

    #[command(
        next_help_heading = "Lifecycle",
        about = "Create a work item",
        long_about = "Create a work item in state `new`. Tag names that do not exist yet are created.",
        after_help = "EXAMPLES:\n    kb create --title \"Make Pasta\" --user 1 --tag Doing\n\n    kb create --title \"Make Rice\" -u 2 -d \"We need to cook some rice\" --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Update a work item",
        long_about = "Change fields of a work item. Flags that are not given keep their current value; --tag replaces the whole tag set.",
        after_help = "EXAMPLES:\n    kb update 1 --state active\n\n    kb update 1 --tag Doing --tag Dinner\n\n    kb update 2 --user 1 --clear-description"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Lifecycle",
        about = "Delete a work item",
        long_about = "Delete a work item. Active items are refused; move them to another state first.",
        after_help = "EXAMPLES:\n    kb delete 2"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one work item",
        after_help = "EXAMPLES:\n    kb show 1\n\n    kb show 1 --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Read",
        about = "List work items",
        long_about = "List work items, optionally filtered by tag, assignee, or state.",
        after_help = "EXAMPLES:\n    kb list\n\n    kb list --tag Doing\n\n    kb list --state active --json"
    )]
    List(cmd::list::ListArgs),

    #[command(next_help_heading = "Read", about = "List tags")]
    Tags,

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    kb completions bash\n\n    kb completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("KANBAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "kanban=debug,info"
        } else {
            "kanban=info,warn"
        })
    });

    let format = env::var("KANBAN_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_root = env::current_dir()?;
    let output = cli.output_mode();
    debug!(root = %project_root.display(), ?output, "starting");

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, output, &project_root),
        Commands::User { ref command } => cmd::user::run_user(command, output, &project_root),
        Commands::Create(ref args) => cmd::create::run_create(args, output, &project_root),
        Commands::Update(ref args) => cmd::update::run_update(args, output, &project_root),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, output, &project_root),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &project_root),
        Commands::List(ref args) => cmd::list::run_list(args, output, &project_root),
        Commands::Tags => cmd::tags::run_tags(output, &project_root),
        Commands::Completions(ref args) => {
            info!(shell = %args.shell, "generating completions");
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
