//! Jira password storage
//!
//! The password lives in its own file, `~/.config/branchlink/secrets.toml`,
//! so `config.toml` can be shared or checked in. On Unix the file has to be
//! owner-only (0600) or loading fails.
//!
//! `JIRA_PASSWORD` in the environment beats the file.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Environment variable holding the Jira password
pub const ENV_JIRA_PASSWORD: &str = "JIRA_PASSWORD";

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// Jira-related secrets
    pub jira: JiraSecrets,
}

/// Jira-related secrets
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JiraSecrets {
    /// Password for basic authentication
    pub password: Option<String>,
}

impl std::fmt::Debug for JiraSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraSecrets")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_secrets_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from `path`, refusing files others can read
    pub fn load_from_file(path: &Path) -> Result<Self> {
        ensure_owner_only(path)?;

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        secrets.jira.password = secrets.jira.password.map(|p| p.trim().to_string());

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/branchlink/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("branchlink").join("secrets.toml"))
    }

    /// Get the Jira password with environment variable override
    ///
    /// Priority: JIRA_PASSWORD env var > secrets file
    pub fn jira_password(&self) -> Option<String> {
        self.jira_password_from(|name| std::env::var(name).ok())
    }

    /// Get the Jira password, consulting `lookup` instead of the process environment
    pub fn jira_password_from<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(password) = lookup(ENV_JIRA_PASSWORD) {
            let password = password.trim().to_string();
            if !password.is_empty() {
                debug!("Using Jira password from {} environment variable", ENV_JIRA_PASSWORD);
                return Some(password);
            }
        }

        match self.jira.password {
            Some(ref password) if !password.is_empty() => {
                debug!("Using Jira password from secrets file");
                Some(password.clone())
            }
            _ => None,
        }
    }

    /// Create a template secrets file at the default location
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Create a template secrets file at `path`
    ///
    /// Missing parent directories are created. The file is created owner-only
    /// and an existing file is left untouched.
    pub fn create_template_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )),
            _ => Error::Io(e),
        })?;
        file.write_all(SECRETS_TEMPLATE.as_bytes())
            .map_err(Error::Io)?;

        warn!(path = %path.display(), "Wrote empty secrets file; set jira.password before use");

        Ok(())
    }
}

const SECRETS_TEMPLATE: &str = r#"# branchlink secrets - keep out of version control
# Must stay owner-only (chmod 600)

[jira]
# Password or API token for jira.username in config.toml
password = ""
"#;

#[cfg(unix)]
fn ensure_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).map_err(Error::Io)?.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(Error::Config(format!(
            "{} has insecure permissions {:o}; run `chmod 600 {}`",
            path.display(),
            mode,
            path.display()
        )));
    }

    debug!(path = %path.display(), mode = format!("{:o}", mode), "Secrets file is owner-only");
    Ok(())
}

#[cfg(not(unix))]
fn ensure_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}
