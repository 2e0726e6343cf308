//! # Repository Selection
//!
//! Resolves the concrete, ordered list of repositories a sweep will visit.
//!
//! - **Explicit mode** looks up each named repository through the hosting
//!   API, in the order given.
//! - **Rule mode** enumerates the organization once and keeps every
//!   repository whose name contains the substring rule or whose topics
//!   include the topic rule.
//!
//! In both modes the ignore set is removed and duplicates are dropped while
//! preserving discovery order. Selection is read-only: nothing is cloned
//! or written.

use std::collections::HashSet;

use log::{debug, info};

use crate::config::{Plan, Selection, SelectionRules};
use crate::error::Result;
use crate::github::{HostingApi, RemoteRepo};

/// A repository the sweep will visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    /// Repository name, unique within a run.
    pub name: String,
    /// URL handed to `git clone`.
    pub remote_url: String,
    pub default_branch: String,
    pub archived: bool,
}

impl From<RemoteRepo> for RepoTarget {
    fn from(repo: RemoteRepo) -> Self {
        Self {
            name: repo.name,
            remote_url: repo.ssh_url,
            default_branch: repo.default_branch,
            archived: repo.archived,
        }
    }
}

/// Chooses the repositories for a run.
pub struct RepoSelector<'a> {
    api: &'a dyn HostingApi,
}

impl<'a> RepoSelector<'a> {
    pub fn new(api: &'a dyn HostingApi) -> Self {
        Self { api }
    }

    /// Resolve the plan's selection into targets.
    pub fn select(&self, plan: &Plan) -> Result<Vec<RepoTarget>> {
        let ignore: HashSet<&str> = plan.ignore.iter().map(String::as_str).collect();
        let candidates = match &plan.selection {
            Selection::Explicit(names) => self.resolve_explicit(&plan.org, names, &ignore)?,
            Selection::Rules(rules) => self.resolve_rules(&plan.org, rules, &ignore)?,
        };

        let mut seen = HashSet::new();
        let targets: Vec<RepoTarget> = candidates
            .into_iter()
            .filter(|t| seen.insert(t.name.clone()))
            .collect();

        info!(
            "Selected {} repositories in {}: {:?}",
            targets.len(),
            plan.org,
            targets.iter().map(|t| t.name.as_str()).collect::<Vec<_>>()
        );
        Ok(targets)
    }

    fn resolve_explicit(
        &self,
        org: &str,
        names: &[String],
        ignore: &HashSet<&str>,
    ) -> Result<Vec<RepoTarget>> {
        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            if ignore.contains(name.as_str()) {
                debug!("Ignoring {}", name);
                continue;
            }
            targets.push(self.api.get_repo(org, name)?.into());
        }
        Ok(targets)
    }

    fn resolve_rules(
        &self,
        org: &str,
        rules: &SelectionRules,
        ignore: &HashSet<&str>,
    ) -> Result<Vec<RepoTarget>> {
        let repos = self.api.list_org_repos(org)?;
        debug!("Organization {} has {} repositories", org, repos.len());

        let mut targets = Vec::new();
        for mut repo in repos {
            if ignore.contains(repo.name.as_str()) {
                debug!("Ignoring {}", repo.name);
                continue;
            }
            let name_hit = rules.matches(&repo.name, &[]);
            if !name_hit && rules.topic.is_some() && repo.topics.is_none() {
                repo.topics = Some(self.api.repo_topics(org, &repo.name)?);
            }
            let topics = repo.topics.as_deref().unwrap_or_default();
            if name_hit || rules.matches(&repo.name, topics) {
                targets.push(repo.into());
            }
        }
        Ok(targets)
    }
}
