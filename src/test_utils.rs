//! Test doubles and git fixtures shared by the unit tests.
//!
//! - [`FakeHosting`] is an in-memory [`HostingApi`].
//! - [`RecordingGit`] wraps the real git operations and records every call,
//!   optionally failing clones of chosen URLs.
//! - [`init_remote`] and friends build bare repositories on local disk that
//!   stand in for GitHub remotes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};
use crate::github::{HostingApi, NewPullRequest, PullRequest, RemoteRepo};
use crate::workspace::{DefaultGitOperations, GitOperations};

/// A remote repository record with `main` as default branch.
pub fn remote(name: &str, url: &str) -> RemoteRepo {
    RemoteRepo {
        name: name.to_string(),
        ssh_url: url.to_string(),
        default_branch: "main".to_string(),
        archived: false,
        topics: None,
    }
}

/// In-memory hosting API.
pub struct FakeHosting {
    repos: Vec<RemoteRepo>,
    topics: HashMap<String, Vec<String>>,
    failing_prs: Vec<String>,
    list_calls: RefCell<usize>,
    topic_lookups: RefCell<Vec<String>>,
    created: RefCell<Vec<(String, NewPullRequest)>>,
}

impl FakeHosting {
    pub fn new(repos: Vec<RemoteRepo>) -> Self {
        Self {
            repos,
            topics: HashMap::new(),
            failing_prs: Vec::new(),
            list_calls: RefCell::new(0),
            topic_lookups: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
        }
    }

    pub fn with_topics(mut self, name: &str, topics: &[&str]) -> Self {
        self.topics.insert(
            name.to_string(),
            topics.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    /// Make pull request creation fail for `name`.
    pub fn failing_pr(mut self, name: &str) -> Self {
        self.failing_prs.push(name.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.borrow()
    }

    pub fn topic_lookups(&self) -> Vec<String> {
        self.topic_lookups.borrow().clone()
    }

    pub fn created_prs(&self) -> Vec<(String, NewPullRequest)> {
        self.created.borrow().clone()
    }
}

impl HostingApi for FakeHosting {
    fn list_org_repos(&self, _org: &str) -> Result<Vec<RemoteRepo>> {
        *self.list_calls.borrow_mut() += 1;
        Ok(self.repos.clone())
    }

    fn get_repo(&self, _org: &str, name: &str) -> Result<RemoteRepo> {
        self.repos
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| Error::GitHubApi {
                status: Some(404),
                message: "Not Found".to_string(),
            })
    }

    fn repo_topics(&self, _org: &str, name: &str) -> Result<Vec<String>> {
        self.topic_lookups.borrow_mut().push(name.to_string());
        Ok(self.topics.get(name).cloned().unwrap_or_default())
    }

    fn create_pull_request(
        &self,
        org: &str,
        repo: &str,
        request: &NewPullRequest,
    ) -> Result<PullRequest> {
        if self.failing_prs.iter().any(|r| r == repo) {
            return Err(Error::GitHubApi {
                status: Some(422),
                message: "Validation Failed".to_string(),
            });
        }
        let mut created = self.created.borrow_mut();
        created.push((repo.to_string(), request.clone()));
        let number = created.len() as u64;
        Ok(PullRequest {
            number,
            html_url: format!("https://github.example/{}/{}/pull/{}", org, repo, number),
        })
    }
}

/// Real git operations with a call log.
pub struct RecordingGit {
    inner: DefaultGitOperations,
    calls: RefCell<Vec<String>>,
    failing_clones: Vec<String>,
}

impl RecordingGit {
    pub fn new() -> Self {
        Self {
            inner: DefaultGitOperations,
            calls: RefCell::new(Vec::new()),
            failing_clones: Vec::new(),
        }
    }

    /// Make clones of `url` fail.
    pub fn failing_clone(mut self, url: &str) -> Self {
        self.failing_clones.push(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls made against the working copy directory named `repo`.
    pub fn calls_for(&self, repo: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.ends_with(&format!("@{}", repo)))
            .collect()
    }

    fn record(&self, op: &str, dir: &Path) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls.borrow_mut().push(format!("{}@{}", op, name));
    }
}

impl GitOperations for RecordingGit {
    fn clone_repo(&self, url: &str, target_dir: &Path) -> Result<()> {
        self.record("clone", target_dir);
        if self.failing_clones.iter().any(|u| u == url) {
            return Err(Error::GitClone {
                url: url.to_string(),
                message: "Could not read from remote repository".to_string(),
            });
        }
        self.inner.clone_repo(url, target_dir)
    }

    fn fetch(&self, dir: &Path) -> Result<()> {
        self.record("fetch", dir);
        self.inner.fetch(dir)
    }

    fn checkout(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("checkout", dir);
        self.inner.checkout(dir, branch)
    }

    fn reset_hard(&self, dir: &Path, rev: &str) -> Result<()> {
        self.record("reset", dir);
        self.inner.reset_hard(dir, rev)
    }

    fn clean(&self, dir: &Path) -> Result<()> {
        self.record("clean", dir);
        self.inner.clean(dir)
    }

    fn pull(&self, dir: &Path) -> Result<()> {
        self.record("pull", dir);
        self.inner.pull(dir)
    }

    fn checkout_new_branch(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("branch", dir);
        self.inner.checkout_new_branch(dir, branch)
    }

    fn stage_all(&self, dir: &Path) -> Result<()> {
        self.record("add", dir);
        self.inner.stage_all(dir)
    }

    fn has_staged_changes(&self, dir: &Path) -> Result<bool> {
        self.record("diff", dir);
        self.inner.has_staged_changes(dir)
    }

    fn has_staged_changes_against(&self, dir: &Path, rev: &str) -> Result<bool> {
        self.record("diff-tip", dir);
        self.inner.has_staged_changes_against(dir, rev)
    }

    fn resolve_commit(&self, dir: &Path, rev: &str) -> Result<Option<String>> {
        self.record("resolve", dir);
        self.inner.resolve_commit(dir, rev)
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.record("commit", dir);
        self.inner.commit(dir, message)
    }

    fn head_sha(&self, dir: &Path) -> Result<String> {
        self.record("rev-parse", dir);
        self.inner.head_sha(dir)
    }

    fn push(&self, dir: &Path, branch: &str) -> Result<()> {
        self.record("push", dir);
        self.inner.push(dir, branch)
    }
}

const ENV_KEYS: [&str; 5] = [
    "GIT_AUTHOR_NAME",
    "GIT_AUTHOR_EMAIL",
    "GIT_COMMITTER_NAME",
    "GIT_COMMITTER_EMAIL",
    "GIT_CONFIG_GLOBAL",
];

/// Sets a throwaway git identity for the current process, restoring the
/// previous environment on drop. Use from `#[serial]` tests only.
pub struct TestIdentity {
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl TestIdentity {
    pub fn set() -> Self {
        let saved = ENV_KEYS.iter().map(|k| (*k, env::var_os(k))).collect();
        env::set_var("GIT_AUTHOR_NAME", "Sweep Test");
        env::set_var("GIT_AUTHOR_EMAIL", "sweep@example.com");
        env::set_var("GIT_COMMITTER_NAME", "Sweep Test");
        env::set_var("GIT_COMMITTER_EMAIL", "sweep@example.com");
        env::set_var("GIT_CONFIG_GLOBAL", "/dev/null");
        Self { saved }
    }
}

impl Drop for TestIdentity {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Run a fixture git command with a fixed identity, panicking on failure.
pub fn fixture_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=Fixture",
            "-c",
            "user.email=fixture@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a bare repository `<root>/remotes/<name>.git` whose `main` branch
/// holds `files`. Returns the path to use as clone URL.
pub fn init_remote(root: &Path, name: &str, files: &[(&str, &str)]) -> String {
    let bare = root.join("remotes").join(format!("{}.git", name));
    fs::create_dir_all(&bare).unwrap();
    fixture_git(&bare, &["init", "--quiet", "--bare", "--initial-branch=main"]);

    let seed = root.join("seeds").join(name);
    fs::create_dir_all(&seed).unwrap();
    fixture_git(&seed, &["init", "--quiet", "--initial-branch=main"]);
    for (path, content) in files {
        let file = seed.join(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file, content).unwrap();
    }
    fixture_git(&seed, &["add", "--all"]);
    fixture_git(&seed, &["commit", "--quiet", "--allow-empty", "-m", "seed"]);
    let url = bare.to_string_lossy().to_string();
    fixture_git(&seed, &["push", "--quiet", &url, "main"]);
    url
}

/// Commit `path` with `content` to the remote's `main`, as another developer would.
pub fn commit_file(root: &Path, remote: &str, path: &str, content: &str) {
    let scratch = root.join("scratch");
    if scratch.exists() {
        fs::remove_dir_all(&scratch).unwrap();
    }
    fixture_git(root, &["clone", "--quiet", remote, "scratch"]);
    fs::write(scratch.join(path), content).unwrap();
    fixture_git(&scratch, &["add", "--all"]);
    fixture_git(&scratch, &["commit", "--quiet", "-m", "upstream change"]);
    fixture_git(&scratch, &["push", "--quiet", "origin", "main"]);
}

/// Point the remote's `main` at `branch`, as merging a pull request would.
pub fn merge_branch(remote: &str, branch: &str) {
    fixture_git(
        Path::new(remote),
        &["update-ref", "refs/heads/main", &format!("refs/heads/{}", branch)],
    );
}

/// Branch names in a bare remote.
pub fn remote_branches(remote: &str) -> Vec<String> {
    fixture_git(
        Path::new(remote),
        &["for-each-ref", "--format=%(refname:short)", "refs/heads"],
    )
    .lines()
    .map(str::to_string)
    .collect()
}

/// Content of `path` on `branch` in a bare remote.
pub fn remote_file(remote: &str, branch: &str, path: &str) -> String {
    fixture_git(Path::new(remote), &["show", &format!("{}:{}", branch, path)])
}
