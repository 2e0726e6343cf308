//! # Workspace Synchronization
//!
//! This module owns the local working copies a sweep edits. Each repository
//! gets its own directory under the workspace root, named after the
//! repository, so repeated runs against the same root reuse earlier clones.
//!
//! ## Design
//!
//! Git access goes through the [`GitOperations`] trait, the same seam the
//! committer and publisher use. [`DefaultGitOperations`] shells out to the
//! system `git`; tests wrap it to record calls or inject failures.
//!
//! [`WorkspaceSync::sync`] guarantees that, when it returns `Ok`, the working
//! copy is on the default branch, identical to `origin/<default>`, with no
//! untracked files. Edits and branches left by an aborted run are discarded,
//! which is what makes a sweep safe to re-run.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::Result;
use crate::selector::RepoTarget;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations {
    /// Clones `url` into `target_dir`, replacing whatever is there.
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()>;

    fn fetch(&self, dir: &Path) -> Result<()>;

    /// Checks out an existing local or remote-tracking branch.
    fn checkout(&self, dir: &Path, branch: &str) -> Result<()>;

    fn reset_hard(&self, dir: &Path, rev: &str) -> Result<()>;

    /// Removes untracked files.
    fn clean(&self, dir: &Path) -> Result<()>;

    fn pull(&self, dir: &Path) -> Result<()>;

    /// Creates or resets `branch` at HEAD and switches to it.
    fn checkout_new_branch(&self, dir: &Path, branch: &str) -> Result<()>;

    fn stage_all(&self, dir: &Path) -> Result<()>;

    /// Whether the index differs from HEAD.
    fn has_staged_changes(&self, dir: &Path) -> Result<bool>;

    /// Whether the index differs from the tree of `rev`.
    fn has_staged_changes_against(&self, dir: &Path, rev: &str) -> Result<bool>;

    /// Revision id of the commit `rev` names, if it exists.
    fn resolve_commit(&self, dir: &Path, rev: &str) -> Result<Option<String>>;

    fn commit(&self, dir: &Path, message: &str) -> Result<()>;

    fn head_sha(&self, dir: &Path) -> Result<String>;

    /// Pushes `branch` to `origin`.
    fn push(&self, dir: &Path, branch: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()> {
        crate::git::clone(url, target_dir)
    }

    fn fetch(&self, dir: &Path) -> Result<()> {
        crate::git::fetch(dir)
    }

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::checkout(dir, branch)
    }

    fn reset_hard(&self, dir: &Path, rev: &str) -> Result<()> {
        crate::git::reset_hard(dir, rev)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        crate::git::clean(dir)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        crate::git::pull(dir)
    }

    fn checkout_new_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::checkout_new_branch(dir, branch)
    }

    fn stage_all(&self, dir: &Path) -> Result<()> {
        crate::git::stage_all(dir)
    }

    fn has_staged_changes(&self, dir: &Path) -> Result<bool> {
        crate::git::has_staged_changes(dir)
    }

    fn has_staged_changes_against(&self, dir: &Path, rev: &str) -> Result<bool> {
        crate::git::has_staged_changes_against(dir, rev)
    }

    fn resolve_commit(&self, dir: &Path, rev: &str) -> Result<Option<String>> {
        crate::git::resolve_commit(dir, rev)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        crate::git::commit(dir, message)
    }

    fn head_sha(&self, dir: &Path) -> Result<String> {
        crate::git::head_sha(dir)
    }

    fn push(&self, dir: &Path, branch: &str) -> Result<()> {
        crate::git::push(dir, branch)
    }
}

/// Where a working copy stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No working copy on disk yet.
    Absent,
    /// Freshly cloned during this run.
    Cloned,
    /// A working copy from an earlier run. Returned by [`WorkspaceSync::sync`]
    /// only after it has been reset to upstream.
    Synced,
}

/// A repository's working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceState {
    pub path: PathBuf,
    pub status: SyncStatus,
}

/// Brings working copies under a workspace root up to date.
pub struct WorkspaceSync<'a> {
    git: &'a dyn GitOperations,
    root: PathBuf,
}

impl<'a> WorkspaceSync<'a> {
    pub fn new(git: &'a dyn GitOperations, root: impl Into<PathBuf>) -> Self {
        Self {
            git,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the working copy for `target`.
    pub fn path_for(&self, target: &RepoTarget) -> PathBuf {
        self.root.join(&target.name)
    }

    /// Report the working copy for `target` without touching it.
    pub fn inspect(&self, target: &RepoTarget) -> WorkspaceState {
        let path = self.path_for(target);
        let status = if path.join(".git").exists() {
            SyncStatus::Synced
        } else {
            SyncStatus::Absent
        };
        WorkspaceState { path, status }
    }

    /// Clone or reset the working copy for `target`.
    pub fn sync(&self, target: &RepoTarget) -> Result<WorkspaceState> {
        let WorkspaceState { path, status } = self.inspect(target);
        let status = match status {
            SyncStatus::Absent => {
                info!("Cloning {} to {}", target.name, path.display());
                self.git.clone_repo(&target.remote_url, &path)?;
                SyncStatus::Cloned
            }
            SyncStatus::Cloned | SyncStatus::Synced => {
                info!(
                    "Resetting {} to origin/{}",
                    target.name, target.default_branch
                );
                self.git.fetch(&path)?;
                self.git.checkout(&path, &target.default_branch)?;
                self.git
                    .reset_hard(&path, &format!("origin/{}", target.default_branch))?;
                self.git.clean(&path)?;
                self.git.pull(&path)?;
                SyncStatus::Synced
            }
        };
        debug!("{} is {:?} at {}", target.name, status, path.display());
        Ok(WorkspaceState { path, status })
    }
}
