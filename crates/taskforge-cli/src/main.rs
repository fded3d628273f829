use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use taskforge_core::config::load_config;
use taskforge_core::error::TaskError;
use taskforge_core::git::{repo_root, SystemRunner};
use taskforge_core::lifecycle::{self, resolve_base_branch, AddOptions, RemoveOptions};
use taskforge_core::registry;
use taskforge_core::task::{TaskInfo, TaskType};

mod version;

#[derive(Parser)]
#[command(name = "taskforge", version, about = "Isolate tasks into git worktrees")]
struct Cli {
    /// Run as if started in this directory
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    /// Emit machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a task branch and worktree
    Add {
        name: String,
        /// Task type: feat, fix or refactor (loose aliases accepted)
        #[arg(long, short = 't')]
        r#type: Option<String>,
        /// Branch to create the task from (default: origin's default branch)
        #[arg(long)]
        base: Option<String>,
        /// Fetch dependencies and write an agent brief into the worktree
        #[arg(long)]
        agent: bool,
        /// Check everything and report the intended branch/path, change nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// List task worktrees
    List,
    /// List task worktrees with ahead/behind counts and dirty state
    Status {
        /// Branch to compare against (default: origin's default branch)
        #[arg(long)]
        base: Option<String>,
    },
    /// Remove a task worktree and its branch
    Remove {
        name: String,
        /// Remove even with uncommitted changes; force-delete the branch
        #[arg(long)]
        force: bool,
        /// Leave the branch in place
        #[arg(long)]
        keep_branch: bool,
    },
    /// Print version information
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if cli.json {
                println!("{}", json!({ "ok": false, "error": err.to_string() }));
            } else {
                eprintln!("error: {err}");
            }
            match err.downcast_ref::<TaskError>() {
                Some(TaskError::Validation(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Command::Version = cli.command {
        println!("taskforge {}", version::FULL);
        return Ok(());
    }

    let cwd = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let runner = SystemRunner::new()?;

    match &cli.command {
        Command::Add {
            name,
            r#type,
            base,
            agent,
            dry_run,
        } => {
            let outcome = lifecycle::add(
                &runner,
                &cwd,
                &AddOptions {
                    name: name.clone(),
                    task_type: r#type.as_deref().map(TaskType::parse),
                    base_branch: base.clone(),
                    with_agent: *agent,
                    dry_run: *dry_run,
                },
            )?;
            if cli.json {
                println!("{}", json!({ "ok": true, "task": outcome }));
            } else {
                let verb = if outcome.created {
                    "created"
                } else {
                    "would create"
                };
                println!(
                    "{verb} {} task '{}' on branch {} at {} (base {})",
                    outcome.task_type.label(),
                    outcome.name,
                    outcome.branch,
                    outcome.path,
                    outcome.base
                );
                for warning in &outcome.warnings {
                    eprintln!("warning: {warning}");
                }
            }
        }
        Command::List => {
            let root = repo_root(&runner, &cwd)?;
            let tasks = registry::list_tasks(&runner, &root)?;
            print_tasks(cli.json, &tasks, false);
        }
        Command::Status { base } => {
            let root = repo_root(&runner, &cwd)?;
            let config = load_config(&root)?;
            let base = resolve_base_branch(&runner, &root, base.as_deref(), &config);
            let tasks = registry::list_tasks_with_status(&runner, &root, &base)?;
            print_tasks(cli.json, &tasks, true);
        }
        Command::Remove {
            name,
            force,
            keep_branch,
        } => {
            let outcome = lifecycle::remove(
                &runner,
                &cwd,
                &RemoveOptions {
                    name: name.clone(),
                    force: *force,
                    keep_branch: *keep_branch,
                },
            )?;
            if cli.json {
                println!("{}", json!({ "ok": true, "removed": outcome }));
            } else {
                println!("removed task '{}' ({})", outcome.name, outcome.path);
                for warning in &outcome.warnings {
                    eprintln!("warning: {warning}");
                }
            }
        }
        Command::Version => unreachable!("handled above"),
    }
    Ok(())
}

fn print_tasks(as_json: bool, tasks: &[TaskInfo], with_status: bool) {
    if as_json {
        println!("{}", json!({ "ok": true, "tasks": tasks }));
        return;
    }
    if tasks.is_empty() {
        println!("no task worktrees");
        return;
    }
    for task in tasks {
        if with_status {
            let dirty = if task.has_changes { " *" } else { "" };
            println!(
                "{:<24} {:<8} {:<32} +{} -{}{}",
                task.name,
                task.task_type.label(),
                task.branch,
                task.commits_ahead,
                task.commits_behind,
                dirty
            );
        } else {
            println!(
                "{:<24} {:<8} {}",
                task.name,
                task.task_type.label(),
                task.branch
            );
        }
    }
}
