//! Task identity: names, types and the naming convention tying a task to a
//! branch and a worktree directory.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::refname::{validate_branch_name, validate_task_name, NameError};

/// Kind of work a task isolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Feat,
    Fix,
    Refactor,
}

impl TaskType {
    /// Parses loose user input. Unrecognized values fall back to `Feat`;
    /// the naming convention is advisory, so this is not an error path.
    pub fn parse(raw: &str) -> TaskType {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fix" | "bugfix" | "hotfix" => TaskType::Fix,
            "ref" | "refactor" => TaskType::Refactor,
            _ => TaskType::Feat,
        }
    }

    /// Prefix of the branch created for a task of this type.
    pub fn branch_prefix(self) -> &'static str {
        match self {
            TaskType::Feat => "feat/",
            TaskType::Fix => "fix/",
            TaskType::Refactor => "refactor/",
        }
    }

    /// Short prefix used in the worktree directory name.
    pub fn dir_prefix(self) -> &'static str {
        match self {
            TaskType::Feat => "feat",
            TaskType::Fix => "fix",
            TaskType::Refactor => "ref",
        }
    }

    /// Human label used in reports and the task brief.
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Feat => "feature",
            TaskType::Fix => "bugfix",
            TaskType::Refactor => "refactor",
        }
    }

    /// Best-effort classification of an existing branch by its prefix.
    /// Branch naming is convention, not enforced, so unknown shapes and the
    /// detached sentinel classify as `Feat`.
    pub fn from_branch(branch: &str) -> TaskType {
        if branch.starts_with("fix/") {
            TaskType::Fix
        } else if branch.starts_with("refactor/") {
            TaskType::Refactor
        } else {
            TaskType::Feat
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_prefix())
    }
}

/// A validated task name. Construction is the only way to obtain one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskName(String);

impl TaskName {
    pub fn new(raw: &str) -> Result<Self, NameError> {
        validate_task_name(raw)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Branch created for a task, e.g. `feat/login`. The combined name is
/// re-validated against the full branch rules.
pub fn branch_for(name: &TaskName, kind: TaskType) -> Result<String, NameError> {
    let branch = format!("{}{}", kind.branch_prefix(), name.as_str());
    validate_branch_name(&branch)?;
    Ok(branch)
}

/// Directory name of the task worktree, e.g. `feat-login`.
pub fn worktree_dir_name(name: &TaskName, kind: TaskType) -> String {
    format!("{}-{}", kind.dir_prefix(), name.as_str())
}

/// Storage directory for all task worktrees: the sibling of the repository
/// root named `<basename>-tasks`. None when the root has no parent or no
/// usable basename (e.g. `/`).
pub fn tasks_root(repo_root: &Path) -> Option<PathBuf> {
    let parent = repo_root.parent()?;
    let basename = repo_root.file_name()?.to_str()?;
    Some(parent.join(format!("{basename}-tasks")))
}

/// One task as reported to the caller. Derived from a single worktree
/// listing; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskInfo {
    pub name: String,
    pub task_type: TaskType,
    /// Bare branch name, or the literal `detached` sentinel.
    pub branch: String,
    pub path: String,
    pub head: Option<String>,
    pub commits_ahead: u32,
    pub commits_behind: u32,
    pub has_changes: bool,
}
