use thiserror::Error;

use crate::config::ConfigError;
use crate::refname::NameError;

/// Everything the lifecycle engine can fail with. Callers map each variant
/// to an exit status and message; nothing here aborts the process.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] NameError),
    #[error("not inside a git working tree")]
    NotAGitRepository,
    #[error("could not resolve the repository root")]
    RepoRootUnresolvable,
    #[error("{0} already exists")]
    NameCollision(String),
    #[error("no task named '{0}'")]
    NotFound(String),
    #[error("worktree at {path} has uncommitted changes; pass force to remove it anyway")]
    DirtyWorktree { path: String },
    #[error("git {context} failed: {stderr}")]
    ExternalTool { context: String, stderr: String },
    #[error("git binary not found on PATH")]
    GitNotFound,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TaskError>;
