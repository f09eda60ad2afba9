//! Configuration file I/O operations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.questfolio/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".questfolio")
    }

    /// Get the global config file path (~/.questfolio/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load from `path`, or from the global location when `None`.
    ///
    /// A missing file is not an error: defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::global_config_path);

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "Loading config");
        Self::from_file(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::RemainderPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml").as_path())).unwrap();
        assert_eq!(config.progression.base_exp_to_next_level, 100);
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[progression]\nremainder = \"reset\"\nbase_exp_to_next_level = 80\n",
        )
        .unwrap();

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.progression.remainder, RemainderPolicy::Reset);
        assert_eq!(loaded.progression.base_exp_to_next_level, 80);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[progression]\ngrowth_factor = \"fast\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
