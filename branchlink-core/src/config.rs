//! Configuration management for branchlink
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (BRANCHLINK_JIRA_*)
//! 3. Config file (~/.config/branchlink/config.toml)
//! 4. Default values
//!
//! The Jira password is not part of the configuration; see [`crate::Secrets`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Default whole-request deadline for Jira calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the Jira base URL
pub const ENV_JIRA_URL: &str = "BRANCHLINK_JIRA_URL";
/// Environment variable overriding the Jira username
pub const ENV_JIRA_USERNAME: &str = "BRANCHLINK_JIRA_USERNAME";
/// Environment variable overriding the request timeout
pub const ENV_JIRA_TIMEOUT: &str = "BRANCHLINK_JIRA_TIMEOUT";

/// Jira connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Base URL of the Jira instance, e.g. `https://jira.example.com`
    pub base_url: Option<String>,

    /// Username for basic authentication
    pub username: Option<String>,

    /// Deadline for a whole request (connect + read); `0s` disables it
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Jira configuration
    pub jira: JiraConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/branchlink/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("branchlink").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - BRANCHLINK_JIRA_URL: Jira base URL
    /// - BRANCHLINK_JIRA_USERNAME: Jira username
    /// - BRANCHLINK_JIRA_TIMEOUT: request timeout (e.g. `10s`, `1m 30s`)
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_JIRA_URL) {
            self.jira.base_url = Some(url);
        }

        if let Some(username) = lookup(ENV_JIRA_USERNAME) {
            self.jira.username = Some(username);
        }

        if let Some(raw) = lookup(ENV_JIRA_TIMEOUT) {
            match humantime::parse_duration(raw.trim()) {
                Ok(timeout) => self.jira.timeout = timeout,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_JIRA_TIMEOUT),
            }
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        base_url: Option<String>,
        username: Option<String>,
        timeout: Option<Duration>,
    ) -> Self {
        if let Some(url) = base_url {
            self.jira.base_url = Some(url);
        }

        if let Some(user) = username {
            self.jira.username = Some(user);
        }

        if let Some(t) = timeout {
            self.jira.timeout = t;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        base_url: Option<String>,
        username: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(base_url, username, timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.jira.base_url.is_none());
        assert!(config.jira.username.is_none());
        assert_eq!(config.jira.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[jira]
base_url = "https://jira.example.com"
username = "jdoe"
timeout = "2s"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.jira.base_url.as_deref(),
            Some("https://jira.example.com")
        );
        assert_eq!(config.jira.username.as_deref(), Some("jdoe"));
        assert_eq!(config.jira.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[jira]
username = "jdoe"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // timeout should use default
        assert_eq!(config.jira.timeout, DEFAULT_TIMEOUT);
        assert!(config.jira.base_url.is_none());
    }

    #[test]
    fn test_zero_timeout_accepted() {
        let config: Config = toml::from_str("[jira]\ntimeout = \"0s\"").unwrap();
        assert!(config.jira.timeout.is_zero());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[jira]\nbase_url = \"http://localhost:8080\"\ntimeout = \"1m\"").unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.jira.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.jira.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[jira]\ntimeout = \"soon\"").unwrap();

        let err = Config::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_JIRA_URL, "https://env.example.com"),
            (ENV_JIRA_USERNAME, "env-user"),
            (ENV_JIRA_TIMEOUT, "5s"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.jira.base_url.as_deref(), Some("https://env.example.com"));
        assert_eq!(config.jira.username.as_deref(), Some("env-user"));
        assert_eq!(config.jira.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_env_timeout_ignored() {
        let config = Config::default().with_overrides_from(|name| {
            (name == ENV_JIRA_TIMEOUT).then(|| "whenever".to_string())
        });
        assert_eq!(config.jira.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_cli_overrides_beat_env() {
        let config = Config::default()
            .with_overrides_from(|name| {
                (name == ENV_JIRA_USERNAME).then(|| "env-user".to_string())
            })
            .with_cli_overrides(None, Some("cli-user".to_string()), Some(Duration::from_secs(3)));

        assert_eq!(config.jira.username.as_deref(), Some("cli-user"));
        assert_eq!(config.jira.timeout, Duration::from_secs(3));
        assert!(config.jira.base_url.is_none());
    }
}
