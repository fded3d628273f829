//! Create/remove orchestration for task worktrees.
//!
//! `add` and `remove` are the only mutating operations in the crate. Every
//! precondition is checked immediately before the mutating git call; a
//! check-then-act window against concurrent invocations remains and is
//! accepted — a losing race surfaces as the tool's own failure text.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::brief::{now_rfc3339, render_task_brief};
use crate::config::{load_config, TaskforgeConfig};
use crate::error::{Result, TaskError};
use crate::git::{self, CommandRunner};
use crate::porcelain::DETACHED;
use crate::refname::validate_path;
use crate::registry::find_task;
use crate::task::{branch_for, tasks_root, worktree_dir_name, TaskName, TaskType};

/// Relative path of the agent brief inside a new worktree.
pub const TASK_BRIEF_PATH: &str = ".claude/TASK.md";

#[derive(Debug, Clone)]
pub struct AddOptions {
    pub name: String,
    /// None lets the repo config choose, falling back to `Feat`.
    pub task_type: Option<TaskType>,
    /// None resolves via config, origin default, local main/master.
    pub base_branch: Option<String>,
    /// Fetch dependencies and write the agent brief into the new worktree.
    pub with_agent: bool,
    /// Run every check and report the intended branch/path without mutating.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub name: String,
    pub task_type: TaskType,
    pub branch: String,
    pub path: String,
    pub base: String,
    /// False for a dry run.
    pub created: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RemoveOptions {
    pub name: String,
    /// Remove a dirty worktree and force-delete its branch.
    pub force: bool,
    pub keep_branch: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveOutcome {
    pub name: String,
    pub branch: String,
    pub path: String,
    pub branch_deleted: bool,
    pub warnings: Vec<String>,
}

/// Base branch for a new task: explicit argument, then repo config, then
/// the origin's default, then local `main`/`master`, then literally `main`.
pub fn resolve_base_branch(
    runner: &dyn CommandRunner,
    root: &Path,
    explicit: Option<&str>,
    config: &TaskforgeConfig,
) -> String {
    if let Some(base) = explicit {
        return base.to_string();
    }
    if let Some(base) = config.base_branch.as_deref() {
        return base.to_string();
    }
    git::default_base_branch(runner, root)
}

/// Creates the branch and worktree for a new task.
///
/// A repeated identical call fails with [`TaskError::NameCollision`] before
/// anything is mutated. A worktree that was actually created is never rolled
/// back; only pre-existence is guarded.
pub fn add(runner: &dyn CommandRunner, cwd: &Path, opts: &AddOptions) -> Result<AddOutcome> {
    let name = TaskName::new(&opts.name)?;
    if !git::is_work_tree(runner, cwd) {
        return Err(TaskError::NotAGitRepository);
    }
    let root = git::repo_root(runner, cwd)?;
    let config = load_config(&root)?;
    let kind = opts
        .task_type
        .or_else(|| config.default_task_type())
        .unwrap_or(TaskType::Feat);
    let branch = branch_for(&name, kind)?;

    let storage = tasks_root(&root).ok_or(TaskError::RepoRootUnresolvable)?;
    let path = storage.join(worktree_dir_name(&name, kind));
    validate_path(&path, Some(&storage))?;
    let base = resolve_base_branch(runner, &root, opts.base_branch.as_deref(), &config);

    if git::branch_exists(runner, &root, &branch) {
        return Err(TaskError::NameCollision(format!("branch '{branch}'")));
    }
    if path.exists() {
        return Err(TaskError::NameCollision(format!(
            "worktree path '{}'",
            path.display()
        )));
    }

    let mut outcome = AddOutcome {
        name: name.as_str().to_string(),
        task_type: kind,
        branch: branch.clone(),
        path: path.to_string_lossy().to_string(),
        base: base.clone(),
        created: false,
        warnings: Vec::new(),
    };
    if opts.dry_run {
        return Ok(outcome);
    }

    fs::create_dir_all(&storage)?;
    let path_arg = path.to_string_lossy().to_string();
    git::git_checked(
        runner,
        &root,
        &["worktree", "add", "-b", &branch, &path_arg, &base],
        "worktree add",
    )?;
    outcome.created = true;

    if opts.with_agent {
        if let Some(warning) = fetch_dependencies(runner, &path) {
            outcome.warnings.push(warning);
        }
        write_task_brief(&path, name.as_str(), kind, &branch, &base)?;
    }
    Ok(outcome)
}

/// Removes a task's worktree and, by default, its branch.
///
/// The worktree must be clean unless `force` is set. Stale worktree metadata
/// is pruned after removal. A branch that refuses a safe delete (unmerged
/// commits) is reported as a warning, not an error: the worktree removal
/// already succeeded.
pub fn remove(
    runner: &dyn CommandRunner,
    cwd: &Path,
    opts: &RemoveOptions,
) -> Result<RemoveOutcome> {
    if !git::is_work_tree(runner, cwd) {
        return Err(TaskError::NotAGitRepository);
    }
    let root = git::repo_root(runner, cwd)?;
    let task = find_task(runner, &root, &opts.name)?;

    if !opts.force && git::is_dirty(runner, Path::new(&task.path))? {
        return Err(TaskError::DirtyWorktree {
            path: task.path.clone(),
        });
    }

    let mut args = vec!["worktree", "remove"];
    if opts.force {
        args.push("--force");
    }
    args.push(&task.path);
    git::git_checked(runner, &root, &args, "worktree remove")?;

    let mut warnings = Vec::new();
    if let Err(err) = git::git_checked(runner, &root, &["worktree", "prune"], "worktree prune") {
        warnings.push(format!("worktree prune failed: {err}"));
    }

    let mut branch_deleted = false;
    if !opts.keep_branch && task.branch != DETACHED {
        let flag = if opts.force { "-D" } else { "-d" };
        match git::git_checked(
            runner,
            &root,
            &["branch", flag, &task.branch],
            "branch delete",
        ) {
            Ok(_) => branch_deleted = true,
            Err(err) => warnings.push(format!(
                "worktree removed, but branch '{}' was not deleted: {err}",
                task.branch
            )),
        }
    }

    Ok(RemoveOutcome {
        name: task.name,
        branch: task.branch,
        path: task.path,
        branch_deleted,
        warnings,
    })
}

/// Runs the project's dependency-fetch step inside the new worktree, picked
/// by lockfile. Returns a warning message on failure; the worktree stays
/// usable either way.
fn fetch_dependencies(runner: &dyn CommandRunner, worktree: &Path) -> Option<String> {
    let (program, args) = dependency_fetch_command(worktree)?;
    match runner.run(program, args, worktree) {
        Ok(output) if output.success() => None,
        Ok(output) => Some(format!(
            "{program} {} failed: {}",
            args.join(" "),
            output.stderr.trim()
        )),
        Err(err) => Some(format!("could not run {program}: {err}")),
    }
}

fn dependency_fetch_command(worktree: &Path) -> Option<(&'static str, &'static [&'static str])> {
    if worktree.join("pnpm-lock.yaml").is_file() {
        Some(("pnpm", &["install"]))
    } else if worktree.join("yarn.lock").is_file() {
        Some(("yarn", &["install"]))
    } else if worktree.join("package.json").is_file() {
        Some(("npm", &["install"]))
    } else if worktree.join("Cargo.toml").is_file() {
        Some(("cargo", &["fetch"]))
    } else {
        None
    }
}

fn write_task_brief(
    worktree: &Path,
    name: &str,
    kind: TaskType,
    branch: &str,
    base: &str,
) -> Result<PathBuf> {
    let path = worktree.join(TASK_BRIEF_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let brief = render_task_brief(name, kind.label(), branch, base, &now_rfc3339());
    fs::write(&path, brief)?;
    Ok(path)
}
