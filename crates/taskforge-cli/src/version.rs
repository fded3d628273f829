pub const FULL: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "+git.",
    env!("TASKFORGE_GIT_COUNT"),
    ".",
    env!("TASKFORGE_GIT_SHA"),
);

#[cfg(test)]
mod tests {
    use super::FULL;

    #[test]
    fn version_carries_the_build_stamp() {
        assert!(FULL.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(FULL.contains("+git."));
    }
}
