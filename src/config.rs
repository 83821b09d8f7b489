//! Configuration loading and management
//!
//! Handles parsing of `trak.toml` configuration files.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{MAX_PRIORITY, MIN_PRIORITY};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the task list files; falls back to the platform
    /// data directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_dir: Option<PathBuf>,

    /// Priority assigned to tasks added without one
    #[serde(default = "default_priority")]
    pub default_priority: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: None,
            default_priority: default_priority(),
        }
    }
}

fn default_priority() -> u8 {
    MIN_PRIORITY
}

impl Config {
    /// Load configuration, in precedence order: the explicit path (must
    /// exist), then `trak.toml` in the platform config directory, then
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::read(path);
        }

        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::read(&path);
            }
        }

        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a TOML configuration document.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.default_priority) {
            return Err(Error::InvalidConfig(format!(
                "default_priority must be {}-{}, got {}",
                MIN_PRIORITY, MAX_PRIORITY, self.default_priority
            )));
        }
        Ok(())
    }

    /// Persist the configuration, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "wrote configuration");
        Ok(())
    }

    /// Location of `trak.toml` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "trak").map(|dirs| dirs.config_dir().join("trak.toml"))
    }

    /// Resolve the save directory: CLI override, then config, then the
    /// platform data directory.
    pub fn resolve_save_dir(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir);
        }
        if let Some(dir) = &self.save_dir {
            return Ok(dir.clone());
        }
        ProjectDirs::from("", "", "trak")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig("cannot determine a platform data directory".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = Config::parse("").expect("parse");
        assert_eq!(config.save_dir, None);
        assert_eq!(config.default_priority, MIN_PRIORITY);
    }

    #[test]
    fn fields_parse_from_toml() {
        let config = Config::parse(
            r#"
            save_dir = "/tmp/trak-tasks"
            default_priority = 2
            "#,
        )
        .expect("parse");
        assert_eq!(config.save_dir, Some(PathBuf::from("/tmp/trak-tasks")));
        assert_eq!(config.default_priority, 2);
    }

    #[test]
    fn out_of_range_priority_is_rejected() {
        let err = Config::parse("default_priority = 9").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn cli_override_wins_save_dir_resolution() {
        let config = Config {
            save_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        let resolved = config
            .resolve_save_dir(Some(PathBuf::from("/from/cli")))
            .expect("resolve");
        assert_eq!(resolved, PathBuf::from("/from/cli"));

        let resolved = config.resolve_save_dir(None).expect("resolve");
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }
}
