//! `kb user add` / `kb user list`.

use crate::cmd::open_session;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode, store_failure};
use clap::{Args, Subcommand};
use kanban_core::model::{NewUser, User};
use kanban_core::users;
use std::io::Write;
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    #[command(
        about = "Add a user who can be assigned work",
        after_help = "EXAMPLES:\n    kb user add --name Adrian --email adrian@example.com"
    )]
    Add(UserAddArgs),

    #[command(about = "List users")]
    List,
}

#[derive(Args, Debug)]
pub struct UserAddArgs {
    #[arg(short, long)]
    pub name: String,

    #[arg(short, long)]
    pub email: String,
}

/// Dispatch a `kb user` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the operation fails.
pub fn run_user(command: &UserCommand, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    match command {
        UserCommand::Add(args) => run_user_add(args, output, project_root),
        UserCommand::List => run_user_list(output, project_root),
    }
}

fn run_user_add(args: &UserAddArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let mut session = open_session(output, project_root)?;
    let new_user = NewUser::new(args.name.as_str(), args.email.as_str());

    let id = match users::create_user(&mut session, new_user) {
        Ok(id) => id,
        Err(e) => return store_failure(output, e),
    };

    let user = User {
        id,
        name: args.name.clone(),
        email: args.email.clone(),
    };
    render_mode(
        output,
        &user,
        |u, w| writeln!(w, "{}\t{}\t{}", u.id, u.name, u.email),
        |u, w| {
            writeln!(w, "Added user {}", u.id)?;
            pretty_kv(w, "name", &u.name)?;
            pretty_kv(w, "email", &u.email)
        },
    )
}

fn run_user_list(output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let session = open_session(output, project_root)?;
    let all = match users::list_users(&session) {
        Ok(all) => all,
        Err(e) => return store_failure(output, e),
    };

    render_mode(
        output,
        &all,
        |list, w| {
            for u in list {
                writeln!(w, "{}\t{}\t{}", u.id, u.name, u.email)?;
            }
            Ok(())
        },
        |list, w| {
            pretty_section(w, &format!("Users ({})", list.len()))?;
            for u in list {
                writeln!(w, "{:>4}  {:<20} {}", u.id, u.name, u.email)?;
            }
            Ok(())
        },
    )
}
