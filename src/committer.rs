//! Topic branch creation and commit.

use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::workspace::GitOperations;

/// What committing produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit with this revision id.
    Committed(String),
    /// The working tree matched the branch point, or the existing topic
    /// branch already holds the same tree; nothing was committed.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    pub branch: String,
    pub outcome: CommitOutcome,
}

impl CommitResult {
    pub fn sha(&self) -> Option<&str> {
        match &self.outcome {
            CommitOutcome::Committed(sha) => Some(sha),
            CommitOutcome::NoOp => None,
        }
    }
}

/// Commits working-tree changes onto a topic branch.
pub struct BranchCommitter<'a> {
    git: &'a dyn GitOperations,
    previous: Option<String>,
}

impl<'a> BranchCommitter<'a> {
    pub fn new(git: &'a dyn GitOperations) -> Self {
        Self {
            git,
            previous: None,
        }
    }

    /// Compare against the topic branch an earlier run left at `rev`
    /// (e.g. `refs/remotes/origin/<branch>`).
    pub fn with_previous(mut self, rev: impl Into<String>) -> Self {
        self.previous = Some(rev.into());
        self
    }

    /// Create or reset `branch` at HEAD, stage everything and commit.
    ///
    /// An unchanged index yields [`CommitOutcome::NoOp`] rather than an error.
    /// So does an index whose tree equals the previous tip, in which case
    /// `branch` is moved back onto that tip.
    pub fn commit(&self, dir: &Path, branch: &str, message: &str) -> Result<CommitResult> {
        // resolved first: checkout -B would move a local tip
        let previous = match &self.previous {
            Some(rev) => self.git.resolve_commit(dir, rev)?,
            None => None,
        };
        let noop = || CommitResult {
            branch: branch.to_string(),
            outcome: CommitOutcome::NoOp,
        };

        self.git.checkout_new_branch(dir, branch)?;
        self.git.stage_all(dir)?;

        if !self.git.has_staged_changes(dir)? {
            debug!("Nothing to commit on {} in {}", branch, dir.display());
            return Ok(noop());
        }

        if let Some(tip) = previous {
            if !self.git.has_staged_changes_against(dir, &tip)? {
                self.git.reset_hard(dir, &tip)?;
                info!("{} already holds this change at {} in {}", branch, tip, dir.display());
                return Ok(noop());
            }
        }

        self.git.commit(dir, message)?;
        let sha = self.git.head_sha(dir)?;
        info!("Committed {} on {} in {}", sha, branch, dir.display());
        Ok(CommitResult {
            branch: branch.to_string(),
            outcome: CommitOutcome::Committed(sha),
        })
    }
}
