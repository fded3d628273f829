//! Name and path validation.
//!
//! Every user-supplied string passes through here before it is interpolated
//! into a git argument vector. All checks are pure; the first violated rule
//! is returned.

use std::path::{Component, Path, PathBuf};

use regex::Regex;
use thiserror::Error;

pub const BRANCH_NAME_MAX: usize = 255;
pub const TASK_NAME_MAX: usize = 50;

/// Character sequences git refuses inside a ref name.
const FORBIDDEN_SEQUENCES: [&str; 10] = ["..", "@{", "\\", " ", "~", "^", ":", "?", "*", "["];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name is {len} characters long, the limit is {max}")]
    TooLong { len: usize, max: usize },
    #[error("branch name may not start with '-'")]
    LeadingHyphen,
    #[error("branch name may not start or end with '/'")]
    SlashAtEdge,
    #[error("branch name may not contain '//'")]
    EmptyComponent,
    #[error("branch name may not end with '.lock'")]
    LockSuffix,
    #[error("branch name may not contain '{0}'")]
    ForbiddenSequence(&'static str),
    #[error("branch name may not contain control characters")]
    ControlCharacter,
    #[error("branch component '{0}' may not start or end with '.'")]
    DotComponent(String),
    #[error("task name must start with a letter and use only letters, digits, '-' and '_'")]
    TaskNameShape,
    #[error("task name may not contain '..' or path separators")]
    TaskNameTraversal,
    #[error("path contains a NUL byte")]
    PathNul,
    #[error("path contains a '..' segment")]
    PathTraversal,
    #[error("path '{0}' escapes the base directory")]
    PathOutsideBase(String),
}

/// Checks a branch name against git's ref-name rules.
pub fn validate_branch_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > BRANCH_NAME_MAX {
        return Err(NameError::TooLong {
            len,
            max: BRANCH_NAME_MAX,
        });
    }
    if name.starts_with('-') {
        return Err(NameError::LeadingHyphen);
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(NameError::SlashAtEdge);
    }
    if name.contains("//") {
        return Err(NameError::EmptyComponent);
    }
    if name.ends_with(".lock") {
        return Err(NameError::LockSuffix);
    }
    for sequence in FORBIDDEN_SEQUENCES {
        if name.contains(sequence) {
            return Err(NameError::ForbiddenSequence(sequence));
        }
    }
    if name.chars().any(|ch| {
        let code = ch as u32;
        code < 32 || code == 127
    }) {
        return Err(NameError::ControlCharacter);
    }
    for component in name.split('/') {
        if component.starts_with('.') || component.ends_with('.') {
            return Err(NameError::DotComponent(component.to_string()));
        }
    }
    Ok(())
}

/// Checks a task name: a letter followed by letters, digits, '-' or '_'.
pub fn validate_task_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    let len = name.chars().count();
    if len > TASK_NAME_MAX {
        return Err(NameError::TooLong {
            len,
            max: TASK_NAME_MAX,
        });
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(NameError::TaskNameTraversal);
    }
    let shape = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("regex");
    if !shape.is_match(name) {
        return Err(NameError::TaskNameShape);
    }
    Ok(())
}

/// Checks a filesystem path for traversal tricks. With a base directory the
/// resolved path must stay inside the resolved base.
pub fn validate_path(path: &Path, base: Option<&Path>) -> Result<(), NameError> {
    if path.to_string_lossy().contains('\0') {
        return Err(NameError::PathNul);
    }
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(NameError::PathTraversal);
    }
    if let Some(base) = base {
        let base = resolve(base);
        let candidate = if path.is_absolute() {
            resolve(path)
        } else {
            resolve(&base.join(path))
        };
        if !candidate.starts_with(&base) {
            return Err(NameError::PathOutsideBase(
                candidate.to_string_lossy().to_string(),
            ));
        }
    }
    Ok(())
}

fn resolve(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
