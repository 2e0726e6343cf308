//! Sweep options shared by `run`, `select` and `validate`.
//!
//! Every option can come from the config file or a flag; flags win.

use anyhow::{Context, Result};
use clap::Args;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use repo_sweep::config::{self, SearchBackend, SweepConfig};
use repo_sweep::defaults::{DEFAULT_API_URL, DEFAULT_CONFIG_FILENAME};
use repo_sweep::github::GitHubClient;

#[derive(Args, Debug, Clone, Default)]
pub struct SweepArgs {
    /// Path to a .repo-sweep.yaml file (defaults to ./.repo-sweep.yaml when present)
    #[arg(short, long, value_name = "FILE", env = "REPO_SWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// GitHub organization owning the repositories
    #[arg(long, value_name = "ORG")]
    pub org: Option<String>,

    /// Explicit repository names (comma separated or repeated)
    #[arg(long = "repo", value_name = "NAME", value_delimiter = ',')]
    pub repos: Vec<String>,

    /// Select repositories whose name contains this text
    #[arg(long, value_name = "TEXT")]
    pub name_contains: Option<String>,

    /// Select repositories carrying this topic
    #[arg(long, value_name = "TOPIC")]
    pub topic: Option<String>,

    /// Repository names to skip (comma separated or repeated)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Topic branch to create in every changed repository
    #[arg(short, long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Commit message, also used as pull request title
    #[arg(short, long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Only edit this repository-relative file instead of searching
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Literal text to replace
    #[arg(short, long, value_name = "TEXT", allow_hyphen_values = true)]
    pub target: Option<String>,

    /// Literal replacement text (may be empty)
    #[arg(short, long, value_name = "TEXT", allow_hyphen_values = true)]
    pub replacement: Option<String>,

    /// Pull request base branch (defaults to each repository's default branch)
    #[arg(long, value_name = "BRANCH")]
    pub base: Option<String>,

    /// Directory holding the working copies (defaults to a new temporary directory)
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Push branches and open pull requests
    #[arg(long)]
    pub publish: bool,

    /// How to find files containing the target
    #[arg(long, value_enum, value_name = "BACKEND")]
    pub search: Option<SearchBackend>,

    /// Delay before each pull request creation, in milliseconds
    #[arg(long, value_name = "MS")]
    pub pr_delay_ms: Option<u64>,

    /// GitHub token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL
    #[arg(long, value_name = "URL", env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

impl SweepArgs {
    /// Sweep options carried by flags alone.
    pub fn overrides(&self) -> SweepConfig {
        SweepConfig {
            org: self.org.clone(),
            repos: self.repos.clone(),
            name_contains: self.name_contains.clone(),
            topic: self.topic.clone(),
            ignore: self.ignore.clone(),
            branch: self.branch.clone(),
            message: self.message.clone(),
            file: self.file.clone(),
            target: self.target.clone(),
            replacement: self.replacement.clone(),
            base: self.base.clone(),
            workspace: self.workspace.clone(),
            publish: self.publish,
            search: self.search,
            pr_delay_ms: self.pr_delay_ms,
        }
    }

    /// The config file to read, if any.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILENAME);
                default.exists().then(|| default.to_path_buf())
            }
        }
    }

    /// File options with flags layered on top.
    pub fn load(&self) -> Result<SweepConfig> {
        let file = match self.config_path() {
            Some(path) => {
                debug!("Reading configuration from {}", path.display());
                config::from_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?
            }
            None => SweepConfig::default(),
        };
        Ok(file.overlay(self.overrides()))
    }

    /// API client for the configured host and token.
    pub fn client(&self) -> GitHubClient {
        let token = self.token.clone().unwrap_or_default();
        if token.is_empty() {
            warn!("No GitHub token given; API requests are unauthenticated");
        }
        GitHubClient::new(token)
            .with_api_url(self.api_url.as_deref().unwrap_or(DEFAULT_API_URL))
    }
}
