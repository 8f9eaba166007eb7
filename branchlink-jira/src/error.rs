//! Error types for Jira operations

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for Jira operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Jira operations
#[derive(Error, Debug)]
pub enum Error {
    /// Client could not be configured (bad base URL, missing credentials)
    #[error("Jira client configuration error: {0}")]
    Config(String),

    /// A request failed at some stage between sending and decoding
    #[error("{operation} failed: {source}")]
    Request {
        /// Name of the client operation that failed
        operation: &'static str,
        #[source]
        source: RequestError,
    },

    /// The issue has no repository or branch linked through dev-status
    #[error("no repositories associated with this issue")]
    NoRepositories,
}

/// The stage at which a request failed
#[derive(Error, Debug)]
pub enum RequestError {
    /// Connection, TLS or timeout failure
    #[error("failed to make request to {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a status other than the expected one
    #[error("request to {path} responded with status {status}")]
    UnexpectedStatus { path: String, status: StatusCode },

    /// Response body could not be read
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Response body was not the expected JSON
    #[error("failed to unmarshal response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response envelope carried a non-empty `errors` list
    #[error("found unexpected errors: {}", .0.join(", "))]
    Upstream(Vec<String>),

    /// More than one instance type was linked to the issue
    #[error("expected 1 repository type but found {}: {}", .0.len(), .0.join(", "))]
    AmbiguousRepositoryType(Vec<String>),
}

impl Error {
    pub(crate) fn request(operation: &'static str, source: RequestError) -> Self {
        Error::Request { operation, source }
    }

    /// Whether this is the [`Error::NoRepositories`] sentinel
    pub fn is_no_repositories(&self) -> bool {
        matches!(self, Error::NoRepositories)
    }

    /// Whether this failure happened while talking to Jira
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request { .. })
    }

    /// Whether the request hit the client timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Request {
                source: RequestError::Transport { source, .. },
                ..
            } => source.is_timeout(),
            Error::Request {
                source: RequestError::Body(source),
                ..
            } => source.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status for [`RequestError::UnexpectedStatus`] failures
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request {
                source: RequestError::UnexpectedStatus { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_errors_joined() {
        let err = Error::request(
            "repository_type",
            RequestError::Upstream(vec!["first".to_string(), "second".to_string()]),
        );
        assert_eq!(
            err.to_string(),
            "repository_type failed: found unexpected errors: first, second"
        );
        assert!(err.is_request());
        assert!(!err.is_no_repositories());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_unexpected_status() {
        let err = Error::request(
            "branches",
            RequestError::UnexpectedStatus {
                path: "/rest/x".to_string(),
                status: StatusCode::NOT_FOUND,
            },
        );
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("responded with status 404"));
    }

    #[test]
    fn test_no_repositories_sentinel() {
        let err = Error::NoRepositories;
        assert!(err.is_no_repositories());
        assert!(!err.is_request());
        assert!(err.status().is_none());
    }
}
