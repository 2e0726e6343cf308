//! # GitHub Integration
//!
//! The sweep talks to the code-hosting service through the [`HostingApi`]
//! trait. It is passed explicitly to the selector and the publisher rather
//! than held globally, so tests substitute an in-memory fake and the rest of
//! the pipeline never sees the shape of a raw API response.
//!
//! [`GitHubClient`] is the production implementation over the GitHub REST
//! API, split by concern:
//!
//! - `client`: authentication, request building, error mapping
//! - `repos`: organization listing (paginated), repository and topic lookup
//! - `pr`: pull request creation

mod client;
mod pr;
mod repos;

pub use client::GitHubClient;
pub use pr::{NewPullRequest, PullRequest};
pub use repos::RemoteRepo;

use crate::error::Result;

/// The subset of the code-hosting API the sweep needs.
pub trait HostingApi {
    /// Every repository owned by `org`, in the order the service lists them.
    fn list_org_repos(&self, org: &str) -> Result<Vec<RemoteRepo>>;

    /// A single repository by name.
    fn get_repo(&self, org: &str, name: &str) -> Result<RemoteRepo>;

    /// Topics attached to a repository.
    fn repo_topics(&self, org: &str, name: &str) -> Result<Vec<String>>;

    /// Open a pull request in `org/repo`.
    fn create_pull_request(
        &self,
        org: &str,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest>;
}
