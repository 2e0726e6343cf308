//! Blocking GitHub REST client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{HostingApi, NewPullRequest, PullRequest, RemoteRepo};
use crate::defaults::{DEFAULT_API_URL, REPOS_PER_PAGE};
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("repo-sweep/", env!("CARGO_PKG_VERSION"));

/// A GitHub API client authenticated with a personal access token.
#[derive(Clone)]
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: Option<String>,
    pub(super) page_size: usize,
}

impl GitHubClient {
    /// Creates a client for api.github.com using `token` for authentication.
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(10))
                .timeout_read(Duration::from_secs(60))
                .build(),
            api_url: DEFAULT_API_URL.to_string(),
            token: (!token.is_empty()).then_some(token),
            page_size: REPOS_PER_PAGE,
        }
    }

    /// Points the client at another API root, e.g. a GitHub Enterprise host.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the page size used for listings.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns the API root this client talks to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self
            .agent
            .request(method, url)
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
            .set("User-Agent", USER_AGENT);
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    pub(super) fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .request("GET", &url)
            .call()
            .map_err(|e| map_ureq_error(&url, e))?;
        read_body(&url, response)
    }

    pub(super) fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        let response = self
            .request("POST", &url)
            .send_json(serde_json::to_value(body)?)
            .map_err(|e| map_ureq_error(&url, e))?;
        read_body(&url, response)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl HostingApi for GitHubClient {
    fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>> {
        self.list_org_repos_paginated(org)
    }

    fn get_repo(&self, org: &str, name: &str) -> Result<RemoteRepo> {
        self.get_json(&format!("repos/{}/{}", org, name))
    }

    fn repo_topics(&self, org: &str, name: &str) -> Result<Vec<String>> {
        self.fetch_topics(org, name)
    }

    fn create_pull_request(
        &self,
        org: &str,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest> {
        self.post_json(&format!("repos/{}/{}/pulls", org, repo), request)
    }
}

/// Error payload returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn read_body<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T> {
    response.into_json::<T>().map_err(|e| Error::GitHubApi {
        status: None,
        message: format!("unexpected response body from {}: {}", url, e),
    })
}

fn map_ureq_error(url: &str, error: ureq::Error) -> Error {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            Error::GitHubApi {
                status: Some(status),
                message: describe_error_body(&body),
            }
        }
        ureq::Error::Transport(transport) => Error::Network {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn describe_error_body(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) else {
        return body.trim().to_string();
    };
    let details: Vec<String> = parsed
        .errors
        .into_iter()
        .filter_map(|d| d.message.or(d.code))
        .collect();
    if details.is_empty() {
        parsed.message
    } else {
        format!("{} ({})", parsed.message, details.join("; "))
    }
}
