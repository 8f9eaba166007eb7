//! Jira API client using reqwest
//!
//! Authentication is username/password basic auth carried as URL userinfo.
//! That is not a strong scheme, but it is what a stock Jira server accepts
//! without extra plugins.

use std::time::Duration;

use branchlink_core::{JiraConfig, Secrets};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::{Error, RequestError, Result};

/// Jira API client
///
/// Holds only immutable configuration and a pooled HTTP client, so a single
/// instance can be shared (or cheaply cloned) across tasks.
#[derive(Clone)]
pub struct JiraClient {
    /// Base URL as configured, shown in logs and `Debug`
    base_url: Url,
    /// Base URL with userinfo set, used for requests
    authed_url: Url,
    http: reqwest::Client,
    timeout: Duration,
}

impl JiraClient {
    /// Create a new Jira client
    ///
    /// `timeout` bounds each whole request, connect through body read. A zero
    /// timeout means no deadline. No network call is made here.
    pub fn new(base_url: &str, username: &str, password: &str, timeout: Duration) -> Result<Self> {
        let mut authed = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("failed to parse base url {}: {}", base_url, e)))?;
        let no_credentials =
            |_: ()| Error::Config(format!("base url {} cannot carry credentials", base_url));

        authed.set_username(username).map_err(no_credentials)?;
        authed.set_password(Some(password)).map_err(no_credentials)?;

        // Userinfo already present in `base_url` is replaced, never shown
        let mut public = authed.clone();
        public.set_username("").map_err(no_credentials)?;
        public.set_password(None).map_err(no_credentials)?;

        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(base_url = %public, ?timeout, "Created Jira client");

        Ok(Self {
            base_url: public,
            authed_url: authed,
            http,
            timeout,
        })
    }

    /// Create a client from loaded configuration and secrets
    pub fn from_config(config: &JiraConfig, secrets: &Secrets) -> Result<Self> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            Error::Config(
                "Jira base URL not set. Set BRANCHLINK_JIRA_URL, pass --url \
                 or add jira.base_url to ~/.config/branchlink/config.toml"
                    .to_string(),
            )
        })?;

        let username = config.username.as_deref().ok_or_else(|| {
            Error::Config(
                "Jira username not set. Set BRANCHLINK_JIRA_USERNAME, pass --username \
                 or add jira.username to ~/.config/branchlink/config.toml"
                    .to_string(),
            )
        })?;

        let password = secrets.jira_password().ok_or_else(|| {
            Error::Config(
                "Jira password not found. Set JIRA_PASSWORD environment variable \
                 or add it to ~/.config/branchlink/secrets.toml"
                    .to_string(),
            )
        })?;

        Self::new(base_url, username, &password, config.timeout)
    }

    /// Base URL of the Jira instance, without credentials
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout; zero means none
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL (credentials included) for an API path
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.authed_url.as_str().trim_end_matches('/'), path)
    }

    /// Issue a GET and check the status code
    ///
    /// The returned response owns the connection; dropping it on any path
    /// hands the connection back to the pool.
    async fn get(&self, operation: &'static str, path: &str, expected: StatusCode) -> Result<Response> {
        debug!(operation, path, "Sending Jira request");

        let response = self
            .http
            .get(self.endpoint(path))
            .send()
            .await
            .map_err(|e| {
                Error::request(
                    operation,
                    RequestError::Transport {
                        path: path.to_string(),
                        source: e.without_url(),
                    },
                )
            })?;

        let status = response.status();
        if status != expected {
            debug!(operation, path, %status, "Unexpected response status");
            return Err(Error::request(
                operation,
                RequestError::UnexpectedStatus {
                    path: path.to_string(),
                    status,
                },
            ));
        }

        Ok(response)
    }

    /// GET `path`, expect 200 and decode the JSON body into `T`
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<T> {
        let response = self.get(operation, path, StatusCode::OK).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::request(operation, RequestError::Body(e.without_url())))?;

        serde_json::from_slice(&body).map_err(|e| Error::request(operation, RequestError::Decode(e)))
    }
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
