//! The agent brief written into a freshly created task worktree.

pub fn now_rfc3339() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Fixed markdown template. Only the task name, type label, branch, base and
/// timestamp are interpolated; everything else is stable so agents can rely
/// on the structure.
pub fn render_task_brief(
    name: &str,
    type_label: &str,
    branch: &str,
    base: &str,
    created: &str,
) -> String {
    format!(
        "\
# Task: {name}

| Field   | Value |
| ------- | ----- |
| Type    | {type_label} |
| Branch  | `{branch}` |
| Base    | `{base}` |
| Created | {created} |

## Goal

Describe what \"done\" looks like for this {type_label} before writing code.

## Working agreement

- Stay inside this worktree; the branch `{branch}` is yours alone.
- Keep commits small and message them in the imperative mood.
- Rebase onto `{base}` before opening a pull request.

## Notes

- [ ] Understand the surrounding code before changing it
- [ ] Add or update tests with the change
- [ ] Leave the worktree clean (commit or discard everything)
"
    )
}
