//! Branchlink Core - configuration and secrets for branchlink
//!
//! Holds the pieces shared between the Jira client and the CLI: where the
//! Jira instance lives, who to log in as, and where the password comes from.

pub mod config;
pub mod error;
pub mod secrets;

pub use config::{Config, JiraConfig};
pub use error::{Error, Result};
pub use secrets::{JiraSecrets, Secrets};
