//! # Sweep Orchestration
//!
//! Drives every selected repository through the pipeline and aggregates the
//! outcome into a [`RunReport`].
//!
//! ## Per-repository state machine
//!
//! ```text
//! Selected -> Syncing -> Searching -> Mutating -> Committing -> Publishing -> Done
//!     |                      |                        |
//!     +-> SkippedArchived    +-> NoMatch              +-> NoOpCommit
//! ```
//!
//! Any stage may end in `Failed`, which records the stage and the error text.
//! Archived repositories are recognized before the workspace is touched.
//! One repository failing never stops the others, and every selected
//! repository gets exactly one [`RunResult`].
//!
//! Selection and the topic-branch check against each repository's default
//! branch run up front in [`Orchestrator::select`]; their errors abort the
//! whole run before any clone.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::committer::{BranchCommitter, CommitOutcome};
use crate::config::Plan;
use crate::defaults::WORKSPACE_PREFIX;
use crate::error::{Error, Result};
use crate::github::HostingApi;
use crate::locator::{self, ChangeLocator, ChangeSet};
use crate::mutator;
use crate::publisher::PrPublisher;
use crate::selector::{RepoSelector, RepoTarget};
use crate::workspace::{GitOperations, WorkspaceSync};

/// Where a repository is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoStage {
    Selected,
    Syncing,
    Searching,
    Mutating,
    Committing,
    Publishing,
    Done,
}

impl fmt::Display for RepoStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepoStage::Selected => "selected",
            RepoStage::Syncing => "sync",
            RepoStage::Searching => "search",
            RepoStage::Mutating => "mutate",
            RepoStage::Committing => "commit",
            RepoStage::Publishing => "publish",
            RepoStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal state of one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    SkippedArchived,
    /// The target string occurs nowhere in the repository.
    NoMatch,
    /// Files were matched but the rewrite left no diff.
    NoOpCommit,
    /// Committed locally; publishing was off.
    Committed { sha: String },
    PrCreated { url: String },
    Failed { stage: RepoStage, reason: String },
}

impl RunStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, RunStatus::Failed { .. })
    }

    /// Short label for summaries.
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::SkippedArchived => "skipped (archived)",
            RunStatus::NoMatch => "no match",
            RunStatus::NoOpCommit => "no changes",
            RunStatus::Committed { .. } => "committed",
            RunStatus::PrCreated { .. } => "pull request",
            RunStatus::Failed { .. } => "failed",
        }
    }
}

/// Outcome for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub repo: String,
    pub status: RunStatus,
    /// Files rewritten, relative to the repository root.
    pub changed_files: Vec<PathBuf>,
    /// Matched files that had vanished before rewrite.
    pub missing_files: Vec<PathBuf>,
}

impl RunResult {
    fn new(repo: &str, status: RunStatus) -> Self {
        Self {
            repo: repo.to_string(),
            status,
            changed_files: Vec::new(),
            missing_files: Vec::new(),
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Root holding one working copy per repository.
    pub workspace: PathBuf,
    pub publish: bool,
    /// One entry per selected repository, in selection order.
    pub results: Vec<RunResult>,
}

impl RunReport {
    /// Rewritten files as `<repo>/<path>`.
    pub fn changed_files(&self) -> Vec<String> {
        self.results
            .iter()
            .flat_map(|r| {
                r.changed_files
                    .iter()
                    .map(move |p| format!("{}/{}", r.repo, p.display()))
            })
            .collect()
    }

    pub fn pr_urls(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter_map(|r| match &r.status {
                RunStatus::PrCreated { url } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&RunResult> {
        self.results
            .iter()
            .filter(|r| r.status.is_failure())
            .collect()
    }

    /// Number of results whose status satisfies `predicate`.
    pub fn count(&self, predicate: impl Fn(&RunStatus) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.status)).count()
    }
}

/// Resolve the workspace root: the configured directory (created if needed)
/// or a fresh temporary directory that outlives the run.
pub fn prepare_workspace(plan: &Plan) -> Result<PathBuf> {
    match &plan.workspace {
        Some(root) => {
            fs::create_dir_all(root)?;
            Ok(fs::canonicalize(root)?)
        }
        None => {
            let dir = tempfile::Builder::new()
                .prefix(WORKSPACE_PREFIX)
                .tempdir()?;
            Ok(dir.keep())
        }
    }
}

/// Runs a validated plan against an organization.
pub struct Orchestrator<'a> {
    plan: &'a Plan,
    api: &'a dyn HostingApi,
    git: &'a dyn GitOperations,
    locator: Box<dyn ChangeLocator>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(plan: &'a Plan, api: &'a dyn HostingApi, git: &'a dyn GitOperations) -> Self {
        Self {
            plan,
            api,
            git,
            locator: locator::for_plan(plan),
        }
    }

    /// Replace the locator chosen from the plan.
    pub fn with_locator(mut self, locator: Box<dyn ChangeLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Resolve the repositories to visit. Read-only.
    pub fn select(&self) -> Result<Vec<RepoTarget>> {
        let targets = RepoSelector::new(self.api).select(self.plan)?;
        self.plan.ensure_branch_not_default(&targets)?;
        Ok(targets)
    }

    /// Select, prepare the workspace, and run every repository.
    pub fn execute(&self) -> Result<RunReport> {
        let targets = self.select()?;
        let root = prepare_workspace(self.plan)?;
        Ok(self.run(&targets, &root, |_, _| {}))
    }

    /// Run `targets` under `root`, calling `on_stage` on every transition.
    pub fn run(
        &self,
        targets: &[RepoTarget],
        root: &Path,
        mut on_stage: impl FnMut(&RepoTarget, RepoStage),
    ) -> RunReport {
        info!(
            "Sweeping {} repositories in {} (workspace {})",
            targets.len(),
            self.plan.org,
            root.display()
        );
        let sync = WorkspaceSync::new(self.git, root);
        let results = targets
            .iter()
            .map(|target| self.process(&sync, target, &mut on_stage))
            .collect();

        RunReport {
            workspace: root.to_path_buf(),
            publish: self.plan.publish,
            results,
        }
    }

    fn process<F>(&self, sync: &WorkspaceSync<'_>, target: &RepoTarget, on_stage: &mut F) -> RunResult
    where
        F: FnMut(&RepoTarget, RepoStage),
    {
        on_stage(target, RepoStage::Selected);

        let mut result = RunResult::new(&target.name, RunStatus::SkippedArchived);
        if target.archived {
            info!("{}: archived, skipping", target.name);
        } else {
            let status = match self.pipeline(sync, target, &mut result, on_stage) {
                Ok(status) => status,
                Err((stage, error)) => {
                    warn!("{}: failed during {}: {}", target.name, stage, error);
                    RunStatus::Failed {
                        stage,
                        reason: error.to_string(),
                    }
                }
            };
            result.status = status;
        }

        info!("{}: {}", target.name, result.status.label());
        on_stage(target, RepoStage::Done);
        result
    }

    fn pipeline<F>(
        &self,
        sync: &WorkspaceSync<'_>,
        target: &RepoTarget,
        result: &mut RunResult,
        on_stage: &mut F,
    ) -> std::result::Result<RunStatus, (RepoStage, Error)>
    where
        F: FnMut(&RepoTarget, RepoStage),
    {
        let mut enter = |stage: RepoStage| {
            debug!("{}: entering {}", target.name, stage);
            on_stage(target, stage);
        };

        enter(RepoStage::Syncing);
        let state = sync.sync(target).map_err(at(RepoStage::Syncing))?;

        enter(RepoStage::Searching);
        let paths = self
            .locator
            .locate(&state.path, &self.plan.target)
            .map_err(at(RepoStage::Searching))?;
        let Some(change_set) = ChangeSet::new(&self.plan.target, &self.plan.replacement, paths)
        else {
            return Ok(RunStatus::NoMatch);
        };
        debug!(
            "{}: {} found {} files",
            target.name,
            self.locator.name(),
            change_set.paths.len()
        );

        enter(RepoStage::Mutating);
        let report = mutator::apply(&state.path, &change_set).map_err(at(RepoStage::Mutating))?;
        info!(
            "{}: {} replacements in {} files",
            target.name,
            report.replacements,
            report.changed.len()
        );
        result.changed_files = report.changed;
        result.missing_files = report.missing;

        enter(RepoStage::Committing);
        let previous = if self.plan.publish {
            format!("refs/remotes/origin/{}", self.plan.branch)
        } else {
            format!("refs/heads/{}", self.plan.branch)
        };
        let commit = BranchCommitter::new(self.git)
            .with_previous(previous)
            .commit(&state.path, &self.plan.branch, &self.plan.message)
            .map_err(at(RepoStage::Committing))?;
        let sha = match commit.outcome {
            CommitOutcome::NoOp => return Ok(RunStatus::NoOpCommit),
            CommitOutcome::Committed(sha) => sha,
        };
        if !self.plan.publish {
            return Ok(RunStatus::Committed { sha });
        }

        enter(RepoStage::Publishing);
        let pr = PrPublisher::new(self.git, self.api, &self.plan.org, self.plan.pr_delay)
            .publish(
                target,
                &state.path,
                &self.plan.branch,
                &self.plan.message,
                self.plan.base_for(target),
            )
            .map_err(at(RepoStage::Publishing))?;
        Ok(RunStatus::PrCreated { url: pr.url })
    }
}

fn at(stage: RepoStage) -> impl FnOnce(Error) -> (RepoStage, Error) {
    move |error| (stage, error)
}
