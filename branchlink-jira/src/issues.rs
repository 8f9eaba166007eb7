//! Issue search by custom field

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dev_status::null_as_default;
use crate::{JiraClient, Result};

/// Jira issue as returned by the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    /// Numeric issue id, as a string
    pub id: String,
    /// Human-facing key, e.g. `PRO-1234`
    pub key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    issues: Vec<Issue>,
}

/// Path for a custom-field JQL search
///
/// Name and value are interpolated verbatim: a value containing JQL syntax
/// or `&` changes the query. Callers must pass trusted input.
fn search_path(filter_name: &str, filter_value: &str) -> String {
    format!("/rest/api/2/search?jql=cf[{}]={}", filter_name, filter_value)
}

impl JiraClient {
    /// Fetch the issues whose custom field `filter_name` equals `filter_value`
    ///
    /// Only the first page of results is returned.
    pub async fn issues_by_custom_filter(
        &self,
        filter_name: &str,
        filter_value: &str,
    ) -> Result<Vec<Issue>> {
        debug!(filter_name, filter_value, "Searching issues by custom field");

        let response: SearchResponse = self
            .get_json("issues_by_custom_filter", &search_path(filter_name, filter_value))
            .await?;

        info!(count = response.issues.len(), "Fetched issues");

        Ok(response.issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_is_verbatim() {
        assert_eq!(
            search_path("10000", "PRO-3425"),
            "/rest/api/2/search?jql=cf[10000]=PRO-3425"
        );
        assert_eq!(
            search_path("10000", "a b&c"),
            "/rest/api/2/search?jql=cf[10000]=a b&c"
        );
    }

    #[test]
    fn test_search_response_missing_or_null_issues() {
        let missing: SearchResponse = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(missing.issues.is_empty());

        let null: SearchResponse = serde_json::from_str(r#"{"issues":null}"#).unwrap();
        assert!(null.issues.is_empty());
    }

    #[test]
    fn test_issue_missing_key_is_empty() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"issues":[{"id":"1"},{"key":"PRO-2"}]}"#).unwrap();
        assert_eq!(response.issues.len(), 2);
        assert_eq!(response.issues[0].id, "1");
        assert!(response.issues[0].key.is_empty());
        assert!(response.issues[1].id.is_empty());
    }

    #[test]
    fn test_issue_ignores_extra_fields() {
        let issue: Issue = serde_json::from_str(
            r#"{"id":"123456","key":"PRO-1234","self":"https://jira/rest/api/2/issue/123456","fields":{}}"#,
        )
        .unwrap();
        assert_eq!(
            issue,
            Issue {
                id: "123456".to_string(),
                key: "PRO-1234".to_string(),
            }
        );
    }
}
