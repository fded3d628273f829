//! Read-only task view derived from the live worktree listing.
//!
//! There is no stored task list: every query re-runs
//! `git worktree list --porcelain` and filters the records to the
//! `<repo>-tasks` sibling directory.

use std::path::Path;

use crate::error::{Result, TaskError};
use crate::git::{self, CommandRunner};
use crate::porcelain::{parse_worktree_list, WorktreeEntry};
use crate::task::{tasks_root, TaskInfo, TaskType};

/// All worktrees attached to the repository, in git's emission order.
pub fn list_worktrees(runner: &dyn CommandRunner, repo_root: &Path) -> Result<Vec<WorktreeEntry>> {
    let output = git::git_checked(
        runner,
        repo_root,
        &["worktree", "list", "--porcelain"],
        "worktree list",
    )?;
    Ok(parse_worktree_list(&output.stdout))
}

/// Task worktrees only: records whose path lies inside the task-storage
/// directory. An absent storage directory simply yields an empty list.
pub fn list_tasks(runner: &dyn CommandRunner, repo_root: &Path) -> Result<Vec<TaskInfo>> {
    let storage = tasks_root(repo_root).ok_or(TaskError::RepoRootUnresolvable)?;
    let entries = list_worktrees(runner, repo_root)?;
    Ok(entries
        .into_iter()
        .filter(|entry| Path::new(&entry.path).starts_with(&storage))
        .map(task_from_entry)
        .collect())
}

/// Tasks with ahead/behind and dirty state filled in. Enrichment runs
/// per task and sequentially; one failing task degrades to zero counts and
/// a clean flag instead of failing the listing.
pub fn list_tasks_with_status(
    runner: &dyn CommandRunner,
    repo_root: &Path,
    base_branch: &str,
) -> Result<Vec<TaskInfo>> {
    let mut tasks = list_tasks(runner, repo_root)?;
    for task in &mut tasks {
        if task.branch != crate::porcelain::DETACHED {
            if let Ok((ahead, behind)) =
                git::ahead_behind(runner, repo_root, base_branch, &task.branch)
            {
                task.commits_ahead = ahead;
                task.commits_behind = behind;
            }
        }
        task.has_changes = git::is_dirty(runner, Path::new(&task.path)).unwrap_or(false);
    }
    Ok(tasks)
}

/// Finds a task by exact name or by a trailing `-<name>` suffix (so
/// `login` matches the conventional directory `feat-login`). First match in
/// listing order wins.
pub fn find_task(
    runner: &dyn CommandRunner,
    repo_root: &Path,
    task_name: &str,
) -> Result<TaskInfo> {
    let suffix = format!("-{task_name}");
    list_tasks(runner, repo_root)?
        .into_iter()
        .find(|task| task.name == task_name || task.name.ends_with(&suffix))
        .ok_or_else(|| TaskError::NotFound(task_name.to_string()))
}

fn task_from_entry(entry: WorktreeEntry) -> TaskInfo {
    let name = Path::new(&entry.path)
        .file_name()
        .map(|segment| segment.to_string_lossy().to_string())
        .unwrap_or_else(|| entry.path.clone());
    let branch = entry.branch_display().to_string();
    TaskInfo {
        name,
        task_type: TaskType::from_branch(&branch),
        branch,
        path: entry.path,
        head: entry.head,
        commits_ahead: 0,
        commits_behind: 0,
        has_changes: false,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testutil::FakeRunner;

    const ROOT: &str = "/home/dev/demo";

    fn listing(blocks: &str) -> FakeRunner {
        FakeRunner::new().ok("git worktree list --porcelain", blocks)
    }

    #[test]
    fn filters_to_the_tasks_directory() {
        let runner = listing(
            "\
worktree /home/dev/demo
HEAD 1111
branch refs/heads/main

worktree /home/dev/demo-tasks/feat-login
HEAD 2222
branch refs/heads/feat/login

worktree /home/dev/elsewhere/feat-other
HEAD 3333
branch refs/heads/feat/other
",
        );
        let tasks = list_tasks(&runner, Path::new(ROOT)).expect("list");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "feat-login");
        assert_eq!(tasks[0].branch, "feat/login");
        assert_eq!(tasks[0].task_type, TaskType::Feat);
    }

    #[test]
    fn infers_type_from_branch_prefix() {
        let runner = listing(
            "\
worktree /home/dev/demo-tasks/fix-crash
HEAD 1111
branch refs/heads/fix/crash

worktree /home/dev/demo-tasks/ref-db
HEAD 2222
branch refs/heads/refactor/db

worktree /home/dev/demo-tasks/oddly-named
HEAD 3333
branch refs/heads/experiment
",
        );
        let tasks = list_tasks(&runner, Path::new(ROOT)).expect("list");
        let types: Vec<TaskType> = tasks.iter().map(|task| task.task_type).collect();
        assert_eq!(
            types,
            vec![TaskType::Fix, TaskType::Refactor, TaskType::Feat]
        );
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        let runner = listing("worktree /home/dev/demo\nHEAD 1111\nbranch refs/heads/main\n");
        let tasks = list_tasks(&runner, Path::new(ROOT)).expect("list");
        assert_eq!(tasks, Vec::new());
    }

    #[test]
    fn find_matches_exact_then_suffix() {
        let runner = listing(
            "\
worktree /home/dev/demo-tasks/feat-login
HEAD 1111
branch refs/heads/feat/login

worktree /home/dev/demo-tasks/fix-login
HEAD 2222
branch refs/heads/fix/login
",
        );
        let found = find_task(&runner, Path::new(ROOT), "login").expect("find");
        assert_eq!(found.name, "feat-login");

        let exact = find_task(&runner, Path::new(ROOT), "fix-login").expect("find");
        assert_eq!(exact.name, "fix-login");

        assert!(matches!(
            find_task(&runner, Path::new(ROOT), "billing"),
            Err(TaskError::NotFound(name)) if name == "billing"
        ));
    }

    #[test]
    fn status_enrichment_fills_counts_and_dirty() {
        let runner = listing(
            "\
worktree /home/dev/demo-tasks/feat-login
HEAD 1111
branch refs/heads/feat/login
",
        )
        .ok("git rev-list --left-right --count main...feat/login", "3\t1\n")
        .ok(
            "git status --porcelain @ /home/dev/demo-tasks/feat-login",
            " M src/main.rs\n",
        );
        let tasks = list_tasks_with_status(&runner, Path::new(ROOT), "main").expect("status");
        assert_eq!(tasks[0].commits_ahead, 1);
        assert_eq!(tasks[0].commits_behind, 3);
        assert!(tasks[0].has_changes);
    }

    #[test]
    fn enrichment_failure_degrades_one_task_only() {
        let runner = listing(
            "\
worktree /home/dev/demo-tasks/feat-broken
HEAD 1111
branch refs/heads/feat/broken

worktree /home/dev/demo-tasks/feat-good
HEAD 2222
branch refs/heads/feat/good
",
        )
        .ok("git rev-list --left-right --count main...feat/good", "0\t2\n")
        .ok("git status --porcelain @ /home/dev/demo-tasks/feat-good", "");
        // feat/broken has no canned responses, so its queries fail.
        let tasks = list_tasks_with_status(&runner, Path::new(ROOT), "main").expect("status");
        assert_eq!(tasks.len(), 2);
        assert_eq!((tasks[0].commits_ahead, tasks[0].commits_behind), (0, 0));
        assert!(!tasks[0].has_changes);
        assert_eq!((tasks[1].commits_ahead, tasks[1].commits_behind), (2, 0));
    }

    #[test]
    fn detached_worktree_skips_ahead_behind() {
        let runner = listing(
            "\
worktree /home/dev/demo-tasks/feat-spike
HEAD 1111
detached
",
        )
        .ok("git status --porcelain @ /home/dev/demo-tasks/feat-spike", "");
        let tasks = list_tasks_with_status(&runner, Path::new(ROOT), "main").expect("status");
        assert_eq!(tasks[0].branch, "detached");
        assert_eq!((tasks[0].commits_ahead, tasks[0].commits_behind), (0, 0));
        // No rev-list call may have been attempted for the sentinel.
        assert!(!runner
            .calls()
            .iter()
            .any(|call| call.contains("rev-list")));
    }
}
