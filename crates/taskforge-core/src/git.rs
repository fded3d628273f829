//! External process gateway and the git queries built on it.
//!
//! The engine never talks to git directly: everything goes through
//! [`CommandRunner`], a single-method capability that tests replace with a
//! canned fake. One invocation runs at a time and blocks until it exits.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, TaskError};

pub const GIT: &str = "git";

/// Captured result of one child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes one external command and captures its output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> io::Result<ProcessOutput>;
}

/// Real runner: spawns the program found on PATH. The git binary is resolved
/// once up front so a missing installation fails with a clear diagnostic
/// instead of a spawn error mid-operation.
pub struct SystemRunner {
    git_binary: PathBuf,
}

impl SystemRunner {
    pub fn new() -> Result<Self> {
        let git_binary = which::which(GIT).map_err(|_| TaskError::GitNotFound)?;
        Ok(Self { git_binary })
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], dir: &Path) -> io::Result<ProcessOutput> {
        let mut command = if program == GIT {
            let mut command = Command::new(&self.git_binary);
            // -C keeps the invocation independent of the process cwd.
            command.arg("-C").arg(dir);
            command
        } else {
            let mut command = Command::new(program);
            command.current_dir(dir);
            command
        };
        let output = command.args(args).output()?;
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Runs git and fails with the tool's own stderr on a non-zero exit.
pub fn git_checked(
    runner: &dyn CommandRunner,
    dir: &Path,
    args: &[&str],
    context: &str,
) -> Result<ProcessOutput> {
    let output = runner.run(GIT, args, dir)?;
    if !output.success() {
        return Err(TaskError::ExternalTool {
            context: context.to_string(),
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// True when `dir` is inside a git working tree.
pub fn is_work_tree(runner: &dyn CommandRunner, dir: &Path) -> bool {
    match runner.run(GIT, &["rev-parse", "--is-inside-work-tree"], dir) {
        Ok(output) => output.success() && output.stdout.trim() == "true",
        Err(_) => false,
    }
}

/// Toplevel of the working tree containing `dir`.
pub fn repo_root(runner: &dyn CommandRunner, dir: &Path) -> Result<PathBuf> {
    let output = runner
        .run(GIT, &["rev-parse", "--show-toplevel"], dir)
        .map_err(TaskError::Io)?;
    let top = output.stdout.trim();
    if !output.success() || top.is_empty() {
        return Err(TaskError::RepoRootUnresolvable);
    }
    Ok(PathBuf::from(top))
}

/// True when a local branch of that name exists.
pub fn branch_exists(runner: &dyn CommandRunner, root: &Path, branch: &str) -> bool {
    let reference = format!("refs/heads/{branch}");
    match runner.run(
        GIT,
        &["rev-parse", "--verify", "--quiet", &reference],
        root,
    ) {
        Ok(output) => output.success(),
        Err(_) => false,
    }
}

/// Base branch used when the caller does not name one: the origin's symbolic
/// default ref, else a local `main`, else a local `master`, else literally
/// `main`.
pub fn default_base_branch(runner: &dyn CommandRunner, root: &Path) -> String {
    if let Ok(output) = runner.run(
        GIT,
        &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"],
        root,
    ) {
        if output.success() {
            let name = output.stdout.trim();
            let name = name.strip_prefix("origin/").unwrap_or(name);
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }
    for candidate in ["main", "master"] {
        if branch_exists(runner, root, candidate) {
            return candidate.to_string();
        }
    }
    "main".to_string()
}

/// Symmetric-difference commit counts for `base...branch`: commits only on
/// the task branch (ahead) and commits only on the base (behind).
pub fn ahead_behind(
    runner: &dyn CommandRunner,
    root: &Path,
    base: &str,
    branch: &str,
) -> Result<(u32, u32)> {
    let range = format!("{base}...{branch}");
    let output = git_checked(
        runner,
        root,
        &["rev-list", "--left-right", "--count", &range],
        "rev-list",
    )?;
    let mut counts = output.stdout.split_whitespace();
    let base_only = parse_count(counts.next())?;
    let branch_only = parse_count(counts.next())?;
    Ok((branch_only, base_only))
}

fn parse_count(field: Option<&str>) -> Result<u32> {
    field
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| TaskError::ExternalTool {
            context: "rev-list".to_string(),
            stderr: "unexpected count output".to_string(),
        })
}

/// True when the worktree at `dir` has uncommitted changes.
pub fn is_dirty(runner: &dyn CommandRunner, dir: &Path) -> Result<bool> {
    let output = git_checked(runner, dir, &["status", "--porcelain"], "status")?;
    Ok(!output.stdout.trim().is_empty())
}
