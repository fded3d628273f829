//! Parser for `git worktree list --porcelain` output.
//!
//! Pure text-to-structure: blocks are separated by a blank line and carry
//! `worktree `, `HEAD `, `branch `, `bare` and `detached` lines. Unknown
//! lines are ignored so newer git versions keep parsing.

use serde::{Deserialize, Serialize};

/// Branch value reported for a worktree whose HEAD is not on any branch.
pub const DETACHED: &str = "detached";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorktreeEntry {
    pub path: String,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub detached: bool,
    #[serde(default)]
    pub bare: bool,
}

impl WorktreeEntry {
    /// Branch name for display: the bare ref name, or the `detached`
    /// sentinel when the worktree has no branch.
    pub fn branch_display(&self) -> &str {
        match &self.branch {
            Some(branch) => branch.as_str(),
            None => DETACHED,
        }
    }
}

/// Parses the porcelain listing into records in git's emission order.
/// A trailing block without a final blank line is still emitted.
pub fn parse_worktree_list(raw: &str) -> Vec<WorktreeEntry> {
    let mut entries = Vec::new();
    let mut current: Option<WorktreeEntry> = None;
    for line in raw.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            continue;
        }
        if let Some(value) = trimmed.strip_prefix("worktree ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            current = Some(WorktreeEntry {
                path: value.to_string(),
                ..WorktreeEntry::default()
            });
            continue;
        }
        let Some(entry) = current.as_mut() else {
            continue;
        };
        if let Some(value) = trimmed.strip_prefix("HEAD ") {
            entry.head = Some(value.trim().to_string());
        } else if let Some(value) = trimmed.strip_prefix("branch ") {
            entry.branch = Some(strip_branch_ref(value.trim()));
        } else if trimmed == "detached" {
            entry.detached = true;
            entry.branch = None;
        } else if trimmed == "bare" {
            entry.bare = true;
        }
    }
    if let Some(entry) = current.take() {
        entries.push(entry);
    }
    entries
}

fn strip_branch_ref(value: &str) -> String {
    value
        .strip_prefix("refs/heads/")
        .unwrap_or(value)
        .to_string()
}
