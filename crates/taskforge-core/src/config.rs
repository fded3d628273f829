use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::TaskType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Optional per-repository defaults, read from `.taskforge.toml` at the
/// repository root. A missing file means all defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskforgeConfig {
    /// Base branch tasks are created from and compared against.
    pub base_branch: Option<String>,
    /// Task type applied when the caller does not name one.
    pub default_task_type: Option<String>,
}

impl TaskforgeConfig {
    pub fn default_task_type(&self) -> Option<TaskType> {
        self.default_task_type
            .as_deref()
            .map(TaskType::parse)
    }
}

pub fn config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".taskforge.toml")
}

pub fn load_config(repo_root: &Path) -> Result<TaskforgeConfig, ConfigError> {
    let path = config_path(repo_root);
    if !path.is_file() {
        return Ok(TaskforgeConfig::default());
    }
    let raw = fs::read_to_string(&path)?;
    Ok(toml::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let config = load_config(temp.path()).expect("load");
        assert_eq!(config.base_branch, None);
        assert_eq!(config.default_task_type(), None);
    }

    #[test]
    fn reads_base_branch_and_task_type() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(
            config_path(temp.path()),
            "base_branch = \"develop\"\ndefault_task_type = \"bugfix\"\n",
        )
        .expect("write");
        let config = load_config(temp.path()).expect("load");
        assert_eq!(config.base_branch.as_deref(), Some("develop"));
        assert_eq!(config.default_task_type(), Some(TaskType::Fix));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(config_path(temp.path()), "base_branch = [").expect("write");
        assert!(matches!(
            load_config(temp.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
