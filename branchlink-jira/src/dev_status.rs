//! Dev-status plugin: linked source-control integration and branches

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::{Error, JiraClient, RequestError, Result};

/// Envelope returned by the dev-status summary and detail endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevStatusResponse {
    /// Errors reported by the plugin; non-empty means the call failed
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
    /// Present on summary responses
    #[serde(default)]
    pub summary: Option<Summary>,
    /// Present on detail responses
    #[serde(rename = "detail", default, deserialize_with = "null_as_default")]
    pub details: Vec<Detail>,
}

/// Summary of dev-status data, grouped by artifact kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub repository: Option<InstanceTypeSummary>,
    #[serde(default)]
    pub branch: Option<InstanceTypeSummary>,
}

/// Per-integration breakdown of one artifact kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceTypeSummary {
    /// Instance type (e.g. `githube`) to its opaque metadata (counts, display name)
    #[serde(rename = "byInstanceType", default, deserialize_with = "null_as_default")]
    pub by_instance_type: BTreeMap<String, serde_json::Value>,
}

/// One entry of a detail response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub repositories: Vec<RepositoryRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub branches: Vec<Branch>,
}

/// A branch referencing the issue
///
/// Missing fields decode as empty rather than failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branch {
    pub name: String,
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub repository: RepositoryRef,
    /// Link to open a pull request from this branch, when the integration offers one
    #[serde(
        rename = "createPullRequestUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub create_pull_request_url: Option<String>,
}

/// Repository name and web URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryRef {
    pub name: String,
    pub url: String,
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Summary {
    /// Instance types linked to the issue
    ///
    /// Branch data wins over repository data; an empty map counts as absent.
    pub fn instance_types(&self) -> Option<&BTreeMap<String, serde_json::Value>> {
        [self.branch.as_ref(), self.repository.as_ref()]
            .into_iter()
            .flatten()
            .map(|s| &s.by_instance_type)
            .find(|types| !types.is_empty())
    }
}

impl DevStatusResponse {
    /// Fail if the plugin reported errors
    pub fn check_errors(self) -> std::result::Result<Self, RequestError> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(RequestError::Upstream(self.errors))
        }
    }

    /// The single instance type linked to the issue
    pub fn repository_type(&self) -> Result<String> {
        let types = self
            .summary
            .as_ref()
            .and_then(Summary::instance_types)
            .ok_or(Error::NoRepositories)?;

        let mut keys = types.keys();
        match (keys.next(), keys.next()) {
            (Some(only), None) => Ok(only.clone()),
            _ => Err(Error::request(
                "repository_type",
                RequestError::AmbiguousRepositoryType(types.keys().cloned().collect()),
            )),
        }
    }

    /// All branches across details, in response order
    pub fn into_branches(self) -> Vec<Branch> {
        self.details
            .into_iter()
            .flat_map(|detail| detail.branches)
            .collect()
    }
}

fn summary_path(issue_id: &str) -> String {
    format!("/rest/dev-status/latest/issue/summary?issueId={}", issue_id)
}

fn detail_path(issue_id: &str, repository_type: &str) -> String {
    format!(
        "/rest/dev-status/latest/issue/detail?issueId={}&applicationType={}&dataType=branch",
        issue_id, repository_type
    )
}

impl JiraClient {
    /// Fetch the source-control instance type linked to an issue
    ///
    /// Returns [`Error::NoRepositories`] when nothing is linked. More than
    /// one linked instance type is reported as a request error.
    pub async fn repository_type(&self, issue_id: &str) -> Result<String> {
        const OPERATION: &str = "repository_type";
        debug!(issue_id, "Fetching dev-status summary");

        let response: DevStatusResponse = self.get_json(OPERATION, &summary_path(issue_id)).await?;
        let response = response
            .check_errors()
            .map_err(|e| Error::request(OPERATION, e))?;

        let repository_type = response.repository_type()?;
        debug!(issue_id, %repository_type, "Resolved repository type");

        Ok(repository_type)
    }

    /// Fetch the branches of `repository_type` that reference an issue
    pub async fn branches(&self, issue_id: &str, repository_type: &str) -> Result<Vec<Branch>> {
        const OPERATION: &str = "branches";
        debug!(issue_id, repository_type, "Fetching dev-status branch detail");

        let response: DevStatusResponse = self
            .get_json(OPERATION, &detail_path(issue_id, repository_type))
            .await?;
        let branches = response
            .check_errors()
            .map_err(|e| Error::request(OPERATION, e))?
            .into_branches();

        info!(issue_id, count = branches.len(), "Fetched branches");

        Ok(branches)
    }

    /// Resolve the repository type of an issue, then fetch its branches
    pub async fn branches_for_issue(&self, issue_id: &str) -> Result<Vec<Branch>> {
        let repository_type = self.repository_type(issue_id).await?;
        self.branches(issue_id, &repository_type).await
    }
}
