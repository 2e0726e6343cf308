use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::Error;

/// Build a `git` command that never stops to prompt for credentials.
fn git() -> Command {
    let mut command = Command::new("git");
    command.env("GIT_TERMINAL_PROMPT", "0");
    command
}

/// Run `git <args>` inside `dir`, failing on a non-zero exit.
fn run_in(dir: &Path, args: &[&str]) -> Result<Output, Error> {
    debug!("git {} (in {})", args.join(" "), dir.display());
    let output = git()
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| command_error(dir, args, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(command_error(dir, args, detail));
    }
    Ok(output)
}

fn command_error(dir: &Path, args: &[&str], stderr: String) -> Error {
    Error::GitCommand {
        command: args.join(" "),
        dir: dir.display().to_string(),
        stderr,
    }
}

/// Clone a repository into `target_dir`
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Any authentication configured in ~/.gitconfig
pub fn clone(url: &str, target_dir: &Path) -> Result<(), Error> {
    // git won't clone into an existing non-empty dir
    if target_dir.exists() {
        fs::remove_dir_all(target_dir)?;
    }
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("git clone {} {}", url, target_dir.display());
    let output = git()
        .args(["clone", "--quiet", url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        let message = if stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
            || stderr.contains("Authentication failed")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                The sweep clones over SSH, so ensure your SSH key is added to ssh-agent.\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            message,
        });
    }

    Ok(())
}

/// Fetch `origin`, pruning deleted remote branches.
pub fn fetch(dir: &Path) -> Result<(), Error> {
    run_in(dir, &["fetch", "--quiet", "--prune", "origin"]).map(drop)
}

/// Check out an existing branch, discarding conflicting local edits.
pub fn checkout(dir: &Path, branch: &str) -> Result<(), Error> {
    run_in(dir, &["checkout", "--quiet", "--force", branch]).map(drop)
}

/// Hard-reset the current branch to `rev`.
pub fn reset_hard(dir: &Path, rev: &str) -> Result<(), Error> {
    run_in(dir, &["reset", "--quiet", "--hard", rev]).map(drop)
}

/// Remove untracked files and directories.
pub fn clean(dir: &Path) -> Result<(), Error> {
    run_in(dir, &["clean", "--quiet", "-f", "-d"]).map(drop)
}

/// Fast-forward the current branch from its upstream.
pub fn pull(dir: &Path) -> Result<(), Error> {
    run_in(dir, &["pull", "--quiet", "--ff-only"]).map(drop)
}

/// Create `branch` at HEAD and switch to it, resetting it if it already exists.
///
/// Working-tree changes are carried over to the new branch.
pub fn checkout_new_branch(dir: &Path, branch: &str) -> Result<(), Error> {
    run_in(dir, &["checkout", "--quiet", "-B", branch]).map(drop)
}

/// Stage every working-tree change, including deletions.
pub fn stage_all(dir: &Path) -> Result<(), Error> {
    run_in(dir, &["add", "--all"]).map(drop)
}

/// Returns true when the index differs from HEAD.
pub fn has_staged_changes(dir: &Path) -> Result<bool, Error> {
    index_differs(dir, &["diff", "--cached", "--quiet"])
}

/// Returns true when the index differs from the tree of `rev`.
pub fn has_staged_changes_against(dir: &Path, rev: &str) -> Result<bool, Error> {
    index_differs(dir, &["diff", "--cached", "--quiet", rev, "--"])
}

fn index_differs(dir: &Path, args: &[&str]) -> Result<bool, Error> {
    debug!("git {} (in {})", args.join(" "), dir.display());
    let status = git()
        .args(args)
        .current_dir(dir)
        .status()
        .map_err(|e| command_error(dir, args, e.to_string()))?;
    match status.code() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(command_error(
            dir,
            args,
            format!("unexpected exit status {}", status),
        )),
    }
}

/// Full revision id of the commit `rev` names, or `None` if it does not exist.
pub fn resolve_commit(dir: &Path, rev: &str) -> Result<Option<String>, Error> {
    let spec = format!("{}^{{commit}}", rev);
    let args = ["rev-parse", "--verify", "--quiet", spec.as_str()];
    debug!("git {} (in {})", args.join(" "), dir.display());
    let output = git()
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| command_error(dir, &args, e.to_string()))?;
    match output.status.code() {
        Some(0) => Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        )),
        Some(1) => Ok(None),
        _ => Err(command_error(
            dir,
            &args,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        )),
    }
}

/// Commit the index with `message`.
pub fn commit(dir: &Path, message: &str) -> Result<(), Error> {
    run_in(dir, &["commit", "--quiet", "-m", message]).map(drop)
}

/// Full revision id of HEAD.
pub fn head_sha(dir: &Path) -> Result<String, Error> {
    let output = run_in(dir, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Push `branch` to `origin` and set it as upstream.
pub fn push(dir: &Path, branch: &str) -> Result<(), Error> {
    run_in(dir, &["push", "--quiet", "--set-upstream", "origin", branch]).map(drop)
}

/// Returns true when `git` can be executed.
pub fn is_available() -> bool {
    git()
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
