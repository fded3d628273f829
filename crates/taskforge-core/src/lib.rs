//! Core engine for taskforge: isolates units of work into git worktrees.
//!
//! Everything here is a structured client over the git command line. No
//! state is kept between calls; every query re-derives the task list from
//! `git worktree list --porcelain`.

pub mod brief;
pub mod config;
pub mod error;
pub mod git;
pub mod lifecycle;
pub mod porcelain;
pub mod refname;
pub mod registry;
pub mod task;

#[cfg(test)]
pub(crate) mod testutil;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::version;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
