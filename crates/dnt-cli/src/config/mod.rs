//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use dnt::CheckerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Canonical DNT policy text file.
    pub policy_path: Option<PathBuf>,

    /// Recheck-time store file.
    pub store_path: Option<PathBuf>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,

    /// Engine settings.
    #[serde(default)]
    pub checker: CheckerConfig,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "dnt", "dntcheck")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Default location of the canonical policy text.
    pub fn default_policy_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("dnt-policy.txt"))
    }

    /// Default location of the recheck store.
    pub fn default_store_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("recheck.json"))
    }

    /// Load configuration from the default file.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.checker.validate()?;

        Ok(config)
    }

    /// Save configuration to the default file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Policy file to use: explicit, configured, or default.
    pub fn policy_path_or_default(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit.or_else(|| self.policy_path.clone()) {
            Some(path) => Ok(path),
            None => Self::default_policy_path(),
        }
    }

    /// Store file to use: explicit, configured, or default.
    pub fn store_path_or_default(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit.or_else(|| self.store_path.clone()) {
            Some(path) => Ok(path),
            None => Self::default_store_path(),
        }
    }

    /// Set a key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "policy_path" | "policy" => self.policy_path = Some(PathBuf::from(value)),
            "store_path" | "store" => self.store_path = Some(PathBuf::from(value)),
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "enabled" => self.checker.enabled = value.parse()?,
            "recheck_interval_secs" => self.checker.recheck_interval_secs = value.parse()?,
            "fetch_timeout_secs" => self.checker.fetch_timeout_secs = value.parse()?,
            "pacing_interval_ms" => self.checker.pacing_interval_ms = value.parse()?,
            "scheme" => self.checker.scheme = value.to_string(),
            "port" => {
                self.checker.port = match value {
                    "" | "none" => None,
                    port => Some(port.parse()?),
                }
            }
            _ => {
                anyhow::bail!(
                    "Unknown config key: {}\n\n\
                     Available keys:\n  \
                     policy_path            - Canonical DNT policy text file\n  \
                     store_path             - Recheck-time store file\n  \
                     output_format          - Default output format (pretty/json)\n  \
                     enabled                - Run checks at all (true/false)\n  \
                     recheck_interval_secs  - Minimum seconds between checks of a domain\n  \
                     fetch_timeout_secs     - Seconds before a fetch counts as failed\n  \
                     pacing_interval_ms     - Milliseconds between outbound fetches (0 = off)\n  \
                     scheme                 - http or https\n  \
                     port                   - Port override (none to clear)",
                    key
                );
            }
        }

        self.checker.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.policy_path.is_none());
        assert_eq!(config.checker, CheckerConfig::default());
    }

    #[test]
    fn test_set_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("policy", "/etc/dnt-policy.txt").unwrap();
        config.set("enabled", "false").unwrap();
        config.set("recheck_interval_secs", "600").unwrap();
        config.set("port", "8080").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.policy_path, Some(PathBuf::from("/etc/dnt-policy.txt")));
        assert!(!loaded.checker.enabled);
        assert_eq!(loaded.checker.recheck_interval_secs, 600);
        assert_eq!(loaded.checker.port, Some(8080));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("no_such_key", "1").is_err());
        assert!(config.set("enabled", "maybe").is_err());
        assert!(config.set("scheme", "gopher").is_err());
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = Config {
            policy_path: Some(PathBuf::from("/configured/policy.txt")),
            ..Config::default()
        };
        assert_eq!(
            config
                .policy_path_or_default(Some(PathBuf::from("/cli/policy.txt")))
                .unwrap(),
            PathBuf::from("/cli/policy.txt")
        );
        assert_eq!(
            config.policy_path_or_default(None).unwrap(),
            PathBuf::from("/configured/policy.txt")
        );
    }
}
