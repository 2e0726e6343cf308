//! Default values for repo-sweep configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::time::Duration;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".repo-sweep.yaml";

/// Default GitHub REST API base URL.
///
/// Can be overridden with `--api-url` or `GITHUB_API_URL` for GitHub
/// Enterprise installations.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Branch names that may never be used as a topic branch.
pub const PROTECTED_BRANCHES: [&str; 2] = ["master", "main"];

/// Delay before each pull-request creation call, in milliseconds.
pub const DEFAULT_PR_DELAY_MS: u64 = 1000;

/// Page size used when enumerating organization repositories.
pub const REPOS_PER_PAGE: usize = 100;

/// Prefix for the temporary workspace created when no root is configured.
pub const WORKSPACE_PREFIX: &str = "repo-sweep-";

/// Returns the default pre-PR backoff as a `Duration`.
pub fn default_pr_delay() -> Duration {
    Duration::from_millis(DEFAULT_PR_DELAY_MS)
}
