//! Pull request creation payloads.

use serde::{Deserialize, Serialize};

/// Request body for `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    /// Branch holding the change.
    pub head: String,
    /// Branch the change should be merged into.
    pub base: String,
    /// Always sent, even when empty.
    pub body: String,
}

/// The part of a created pull request the sweep reports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
}
