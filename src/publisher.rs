//! Branch push and pull request creation.
//!
//! Every pull request creation is preceded by a fixed delay, the only rate
//! limiting the sweep applies against the hosting API.

use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::error::Result;
use crate::github::{HostingApi, NewPullRequest};
use crate::selector::RepoTarget;
use crate::workspace::GitOperations;

/// A pull request opened for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrResult {
    pub url: String,
}

/// Pushes topic branches and opens pull requests.
pub struct PrPublisher<'a> {
    git: &'a dyn GitOperations,
    api: &'a dyn HostingApi,
    org: String,
    delay: Duration,
}

impl<'a> PrPublisher<'a> {
    pub fn new(
        git: &'a dyn GitOperations,
        api: &'a dyn HostingApi,
        org: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            git,
            api,
            org: org.into(),
            delay,
        }
    }

    /// Push `branch` from `dir` and open a pull request into `base`, titled
    /// `title` with an empty body.
    pub fn publish(
        &self,
        target: &RepoTarget,
        dir: &Path,
        branch: &str,
        title: &str,
        base: &str,
    ) -> Result<PrResult> {
        info!("Pushing {} for {}", branch, target.name);
        self.git.push(dir, branch)?;

        if !self.delay.is_zero() {
            debug!("Waiting {:?} before opening pull request", self.delay);
            thread::sleep(self.delay);
        }

        let request = NewPullRequest {
            title: title.to_string(),
            head: branch.to_string(),
            base: base.to_string(),
            body: String::new(),
        };
        let pr = self
            .api
            .create_pull_request(&self.org, &target.name, &request)?;
        info!("Opened pull request #{} for {}: {}", pr.number, target.name, pr.html_url);
        Ok(PrResult { url: pr.html_url })
    }
}
