//! # Run Configuration and Pre-flight Validation
//!
//! This module defines the options a sweep accepts and turns them into a
//! validated [`Plan`]. Options can come from a `.repo-sweep.yaml` file, from
//! command-line flags, or both; flags are layered over the file with
//! [`SweepConfig::overlay`].
//!
//! ## Example configuration
//!
//! ```yaml
//! org: acme
//! name-contains: svc-
//! ignore: [svc-legacy]
//! branch: bump-tool-1.3.0
//! message: Bump tool to 1.3.0
//! target: tool==1.2.3
//! replacement: tool==1.3.0
//! publish: true
//! ```
//!
//! ## Validation
//!
//! [`SweepConfig::validate`] is the only place configuration errors are
//! raised. It runs before any network or filesystem work, so a bad
//! configuration never leaves a half-processed organization behind. The one
//! check that needs repository metadata (topic branch versus each selected
//! repository's default branch) lives in [`Plan::ensure_branch_not_default`]
//! and runs after the read-only selection step.

use crate::defaults::{default_pr_delay, PROTECTED_BRANCHES};
use crate::error::{Error, Result};
use crate::selector::RepoTarget;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Backend used to find files containing the target string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchBackend {
    /// Shell out to `grep -rlF`
    #[default]
    Grep,
    /// Walk the workspace in process
    Builtin,
}

/// Raw sweep options as read from a config file or the command line.
///
/// Every field is optional at this level so that a file can hold the stable
/// part of a sweep and flags can supply the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SweepConfig {
    /// GitHub organization that owns the repositories.
    #[serde(default)]
    pub org: Option<String>,
    /// Explicit repository names. Mutually exclusive with the rules below.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Keep repositories whose name contains this substring.
    #[serde(default)]
    pub name_contains: Option<String>,
    /// Keep repositories carrying this topic.
    #[serde(default)]
    pub topic: Option<String>,
    /// Repository names to skip.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Topic branch to create.
    #[serde(default)]
    pub branch: Option<String>,
    /// Commit message, also used as the pull request title.
    #[serde(default)]
    pub message: Option<String>,
    /// Repository-relative file to edit. Absent means search the whole tree.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Literal text to replace.
    #[serde(default)]
    pub target: Option<String>,
    /// Literal replacement text.
    #[serde(default)]
    pub replacement: Option<String>,
    /// Pull request base branch. Defaults to each repository's default branch.
    #[serde(default)]
    pub base: Option<String>,
    /// Directory holding one working copy per repository.
    #[serde(default)]
    pub workspace: Option<PathBuf>,
    /// Push branches and open pull requests.
    #[serde(default)]
    pub publish: bool,
    /// Search backend used when no file is configured.
    #[serde(default)]
    pub search: Option<SearchBackend>,
    /// Delay before each pull request creation call.
    #[serde(default)]
    pub pr_delay_ms: Option<u64>,
}

/// How repositories are chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Exactly these repositories, in this order.
    Explicit(Vec<String>),
    /// Every organization repository matching at least one rule.
    Rules(SelectionRules),
}

/// Name and topic rules. At least one is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRules {
    pub name_contains: Option<String>,
    pub topic: Option<String>,
}

impl SelectionRules {
    /// Returns true when the repository matches the name rule or the topic rule.
    pub fn matches(&self, name: &str, topics: &[String]) -> bool {
        let by_name = self
            .name_contains
            .as_deref()
            .is_some_and(|needle| name.contains(needle));
        let by_topic = self
            .topic
            .as_deref()
            .is_some_and(|topic| topics.iter().any(|t| t == topic));
        by_name || by_topic
    }
}

/// A validated, fully resolved sweep.
#[derive(Debug, Clone)]
pub struct Plan {
    pub org: String,
    pub selection: Selection,
    pub ignore: Vec<String>,
    pub branch: String,
    pub message: String,
    pub file: Option<PathBuf>,
    pub target: String,
    pub replacement: String,
    pub base: Option<String>,
    pub workspace: Option<PathBuf>,
    pub publish: bool,
    pub search: SearchBackend,
    pub pr_delay: Duration,
}

/// Parse a YAML configuration string.
pub fn parse(yaml: &str) -> Result<SweepConfig> {
    if yaml.trim().is_empty() {
        return Ok(SweepConfig::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse a YAML configuration file.
pub fn from_file(path: &Path) -> Result<SweepConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

impl SweepConfig {
    /// Layer `overrides` on top of `self`.
    ///
    /// Set values in `overrides` win; list options are replaced wholesale when
    /// the override list is non-empty. `publish` is enabled if either side
    /// enables it.
    pub fn overlay(self, overrides: SweepConfig) -> SweepConfig {
        SweepConfig {
            org: overrides.org.or(self.org),
            repos: if overrides.repos.is_empty() {
                self.repos
            } else {
                overrides.repos
            },
            name_contains: overrides.name_contains.or(self.name_contains),
            topic: overrides.topic.or(self.topic),
            ignore: if overrides.ignore.is_empty() {
                self.ignore
            } else {
                overrides.ignore
            },
            branch: overrides.branch.or(self.branch),
            message: overrides.message.or(self.message),
            file: overrides.file.or(self.file),
            target: overrides.target.or(self.target),
            replacement: overrides.replacement.or(self.replacement),
            base: overrides.base.or(self.base),
            workspace: overrides.workspace.or(self.workspace),
            publish: overrides.publish || self.publish,
            search: overrides.search.or(self.search),
            pr_delay_ms: overrides.pr_delay_ms.or(self.pr_delay_ms),
        }
    }

    /// Resolve the selection mode.
    ///
    /// Exactly one mode is valid: an explicit list, or one or both rules.
    pub fn selection(&self) -> Result<Selection> {
        let name_contains = non_empty("name-contains", self.name_contains.as_deref())?;
        let topic = non_empty("topic", self.topic.as_deref())?;
        let has_rule = name_contains.is_some() || topic.is_some();

        match (self.repos.is_empty(), has_rule) {
            (false, true) => Err(Error::config_with_hint(
                "an explicit repository list cannot be combined with a name or topic rule",
                "use either `repos` or `name-contains`/`topic`, not both",
            )),
            (true, false) => Err(Error::config_with_hint(
                "no repository selection given",
                "set `repos`, `name-contains`, or `topic`",
            )),
            (false, false) => {
                let mut names: Vec<String> = Vec::with_capacity(self.repos.len());
                for name in &self.repos {
                    let name = name.trim();
                    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
                        return Err(Error::config(format!(
                            "invalid repository name '{}'",
                            name
                        )));
                    }
                    if !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }
                Ok(Selection::Explicit(names))
            }
            (true, true) => Ok(Selection::Rules(SelectionRules {
                name_contains,
                topic,
            })),
        }
    }

    /// Validate every option and produce a [`Plan`].
    pub fn validate(&self) -> Result<Plan> {
        let org = required("org", self.org.as_deref())?;
        let selection = self.selection()?;
        let branch = required("branch", self.branch.as_deref())?;
        validate_branch_name(&branch)?;
        let message = required("message", self.message.as_deref())?;

        let target = required("target", self.target.as_deref())?;
        if target.contains('\n') || target.contains('\r') {
            return Err(Error::config("target must fit on a single line"));
        }
        let replacement = self
            .replacement
            .clone()
            .ok_or_else(|| Error::config("missing required option `replacement`"))?;
        if replacement.contains('\n') || replacement.contains('\r') {
            return Err(Error::config("replacement must fit on a single line"));
        }

        if let Some(file) = &self.file {
            validate_relative_path(file)?;
        }

        let base = non_empty("base", self.base.as_deref())?;
        if base.as_deref() == Some(branch.as_str()) {
            return Err(Error::config(format!(
                "base branch and topic branch are both '{}'",
                branch
            )));
        }

        Ok(Plan {
            org,
            selection,
            ignore: self.ignore.iter().map(|s| s.trim().to_string()).collect(),
            branch,
            message,
            file: self.file.clone(),
            target,
            replacement,
            base,
            workspace: self.workspace.clone(),
            publish: self.publish,
            search: self.search.unwrap_or_default(),
            pr_delay: self
                .pr_delay_ms
                .map(Duration::from_millis)
                .unwrap_or_else(default_pr_delay),
        })
    }
}

impl Plan {
    /// Reject the run if the topic branch is any selected repository's
    /// default branch.
    pub fn ensure_branch_not_default(&self, targets: &[RepoTarget]) -> Result<()> {
        if let Some(target) = targets.iter().find(|t| t.default_branch == self.branch) {
            return Err(Error::config_with_hint(
                format!(
                    "topic branch '{}' is the default branch of {}",
                    self.branch, target.name
                ),
                "choose a topic branch name that no selected repository uses as its default",
            ));
        }
        Ok(())
    }

    /// Base branch for a pull request against `target`.
    pub fn base_for<'a>(&'a self, target: &'a RepoTarget) -> &'a str {
        self.base.as_deref().unwrap_or(&target.default_branch)
    }
}

fn required(option: &str, value: Option<&str>) -> Result<String> {
    non_empty(option, value)?
        .ok_or_else(|| Error::config(format!("missing required option `{}`", option)))
}

fn non_empty(option: &str, value: Option<&str>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => {
            Err(Error::config(format!("option `{}` must not be empty", option)))
        }
        Some(v) => Ok(Some(v.to_string())),
    }
}

fn validate_branch_name(branch: &str) -> Result<()> {
    if PROTECTED_BRANCHES.contains(&branch) {
        return Err(Error::config_with_hint(
            format!("topic branch '{}' is a protected branch", branch),
            "the sweep commits to a new branch; pick a name such as `bump-tool-1.3.0`",
        ));
    }
    if branch.starts_with('-')
        || branch.contains("..")
        || branch.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(Error::config(format!("invalid branch name '{}'", branch)));
    }
    Ok(())
}

fn validate_relative_path(path: &Path) -> Result<()> {
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes || path.as_os_str().is_empty() {
        return Err(Error::config_with_hint(
            format!("file path '{}' must stay inside the repository", path.display()),
            "give the path relative to the repository root",
        ));
    }
    Ok(())
}
