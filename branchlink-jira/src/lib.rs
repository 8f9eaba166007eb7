//! Branchlink Jira - minimal Jira REST client
//!
//! This crate searches issues by custom field and reads the dev-status
//! plugin's view of an issue: which source-control integration it is
//! linked to and which branches reference it.

mod client;
mod dev_status;
mod error;
mod issues;

pub use client::JiraClient;
pub use dev_status::{
    Branch, Detail, DevStatusResponse, InstanceTypeSummary, RepositoryRef, Summary,
};
pub use error::{Error, RequestError, Result};
pub use issues::Issue;
