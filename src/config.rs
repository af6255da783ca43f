use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ReleaseVersion;
use crate::error::{ReleaseError, Result};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "release-tags.toml";

/// Environment variable holding an explicit configuration path
pub const CONFIG_ENV_VAR: &str = "RELEASE_TAGS_CONFIG";

/// Represents the complete configuration for release-tags.
///
/// Contains publishing behavior and the conventional commit settings used to
/// derive the next version.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub conventional_commits: ConventionalCommitsConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_initial_version() -> String {
    "v0.1.0".to_string()
}

/// Controls where and how release tags are published.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    /// Remote that tags are fetched from and pushed to
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Push created tags to the remote
    #[serde(default = "default_true")]
    pub push: bool,

    /// Fetch remote tags before resolving
    #[serde(default = "default_true")]
    pub fetch: bool,

    /// Version used when the repository has no release yet
    #[serde(default = "default_initial_version")]
    pub initial_version: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            remote: default_remote(),
            push: true,
            fetch: true,
            initial_version: default_initial_version(),
        }
    }
}

fn default_commit_types() -> Vec<String> {
    ["feat", "fix", "docs", "style", "refactor", "test", "chore", "build", "ci", "perf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_breaking_change_indicators() -> Vec<String> {
    vec![
        "BREAKING CHANGE:".to_string(),
        "BREAKING-CHANGE:".to_string(),
    ]
}

fn default_major_keywords() -> Vec<String> {
    vec!["breaking".to_string(), "deprecate".to_string()]
}

fn default_minor_keywords() -> Vec<String> {
    vec![
        "feature".to_string(),
        "feat".to_string(),
        "enhancement".to_string(),
    ]
}

/// Configuration for conventional commit analysis.
///
/// Defines the types, breaking change indicators, and keywords used to analyze
/// commits and decide the next version.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConventionalCommitsConfig {
    #[serde(default = "default_commit_types")]
    pub types: Vec<String>,

    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    #[serde(default = "default_major_keywords")]
    pub major_keywords: Vec<String>,

    #[serde(default = "default_minor_keywords")]
    pub minor_keywords: Vec<String>,
}

impl Default for ConventionalCommitsConfig {
    fn default() -> Self {
        ConventionalCommitsConfig {
            types: default_commit_types(),
            breaking_change_indicators: default_breaking_change_indicators(),
            major_keywords: default_major_keywords(),
            minor_keywords: default_minor_keywords(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.publish.remote.trim().is_empty() {
            return Err(ReleaseError::config("publish.remote must not be empty"));
        }

        let initial = ReleaseVersion::parse(&self.publish.initial_version)
            .map_err(|e| ReleaseError::config(format!("publish.initial_version: {}", e)))?;
        if initial.is_prerelease() {
            return Err(ReleaseError::config(format!(
                "publish.initial_version '{}' must not be a prerelease",
                initial
            )));
        }
        if !initial.is_full() {
            return Err(ReleaseError::config(format!(
                "publish.initial_version '{}' must spell out MAJOR.MINOR.PATCH",
                initial
            )));
        }

        Ok(())
    }

    /// The configured first version, already validated
    pub fn initial_version(&self) -> Result<ReleaseVersion> {
        ReleaseVersion::parse(&self.publish.initial_version)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. Path in the `RELEASE_TAGS_CONFIG` environment variable
/// 3. `release-tags.toml` in current directory
/// 4. `release-tags.toml` in the user config directory
/// 5. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    match locate_config(config_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            let text = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            Config::from_toml(&text)
        }
        None => Ok(Config::default()),
    }
}

fn locate_config(config_path: Option<&str>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(PathBuf::from(path));
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.publish.remote, "origin");
        assert!(config.publish.push);
        assert_eq!(config.initial_version().unwrap().as_str(), "v0.1.0");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml("[publish]\npush = false\n").unwrap();
        assert!(!config.publish.push);
        assert!(config.publish.fetch);
        assert_eq!(config.publish.remote, "origin");
        assert_eq!(config.conventional_commits, ConventionalCommitsConfig::default());
    }

    #[test]
    fn test_invalid_initial_version_rejected() {
        let err = Config::from_toml("[publish]\ninitial_version = \"0.1.0\"\n").unwrap_err();
        assert!(err.to_string().contains("initial_version"));

        let err = Config::from_toml("[publish]\ninitial_version = \"v1.0.0-rc.1\"\n").unwrap_err();
        assert!(err.to_string().contains("prerelease"));
    }

    #[test]
    fn test_shorthand_initial_version_rejected() {
        for shorthand in ["v1", "v1.2"] {
            let text = format!("[publish]\ninitial_version = \"{}\"\n", shorthand);
            let err = Config::from_toml(&text).unwrap_err();
            assert!(err.to_string().contains("MAJOR.MINOR.PATCH"), "got: {}", err);
        }
    }

    #[test]
    fn test_empty_remote_rejected() {
        assert!(Config::from_toml("[publish]\nremote = \"  \"\n").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[publish\n").unwrap_err();
        assert!(matches!(err, ReleaseError::Toml(_)));
    }
}
