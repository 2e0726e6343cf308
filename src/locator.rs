//! # Change Discovery
//!
//! Finds the files inside a synced working copy that the sweep should edit.
//! The [`ChangeLocator`] trait has three implementations:
//!
//! - [`ExplicitPath`]: the configured file, taken on trust. Whether it exists
//!   is only checked when the mutator opens it.
//! - [`TextSearch`]: an external `grep -rlIF` run over the working copy.
//! - [`BuiltinSearch`]: the same literal search done in process, for hosts
//!   without a usable `grep`.
//!
//! All searches are literal and case-sensitive, skip the `.git` directory and
//! binary files, and return repository-relative paths in sorted order.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;
use walkdir::WalkDir;

use crate::config::{Plan, SearchBackend};
use crate::error::{Error, Result};

/// Bytes inspected when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 8000;

/// Finds candidate files for a substitution.
pub trait ChangeLocator {
    /// Repository-relative paths under `workspace` to rewrite.
    fn locate(&self, workspace: &Path, target: &str) -> Result<Vec<PathBuf>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// What to substitute and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub target: String,
    pub replacement: String,
    /// Never empty.
    pub paths: Vec<PathBuf>,
}

impl ChangeSet {
    /// Returns `None` when there is nothing to change.
    pub fn new(
        target: impl Into<String>,
        replacement: impl Into<String>,
        paths: Vec<PathBuf>,
    ) -> Option<Self> {
        if paths.is_empty() {
            return None;
        }
        Some(Self {
            target: target.into(),
            replacement: replacement.into(),
            paths,
        })
    }
}

/// Build the locator a plan asks for.
pub fn for_plan(plan: &Plan) -> Box<dyn ChangeLocator> {
    match (&plan.file, plan.search) {
        (Some(path), _) => Box::new(ExplicitPath::new(path.clone())),
        (None, SearchBackend::Grep) => Box::new(TextSearch::default()),
        (None, SearchBackend::Builtin) => Box::new(BuiltinSearch),
    }
}

/// A single configured file.
#[derive(Debug, Clone)]
pub struct ExplicitPath {
    path: PathBuf,
}

impl ExplicitPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChangeLocator for ExplicitPath {
    fn locate(&self, _workspace: &Path, _target: &str) -> Result<Vec<PathBuf>> {
        Ok(vec![self.path.clone()])
    }

    fn name(&self) -> &str {
        "explicit path"
    }
}

/// Literal search through an external `grep`.
#[derive(Debug, Clone)]
pub struct TextSearch {
    program: String,
}

impl TextSearch {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TextSearch {
    fn default() -> Self {
        Self::new("grep")
    }
}

impl ChangeLocator for TextSearch {
    fn locate(&self, workspace: &Path, target: &str) -> Result<Vec<PathBuf>> {
        let output = Command::new(&self.program)
            .args(["-r", "-l", "-I", "-F", "--exclude-dir=.git", "-e", target, "."])
            .current_dir(workspace)
            .output()
            .map_err(|e| Error::Search {
                tool: self.program.clone(),
                message: e.to_string(),
            })?;

        match output.status.code() {
            Some(0) => {}
            Some(1) => return Ok(Vec::new()),
            _ => {
                return Err(Error::Search {
                    tool: self.program.clone(),
                    message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut paths: Vec<PathBuf> = stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| PathBuf::from(line.strip_prefix("./").unwrap_or(line)))
            .collect();
        paths.sort();
        debug!(
            "{} found {} candidate files in {}",
            self.program,
            paths.len(),
            workspace.display()
        );
        Ok(paths)
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Literal search implemented with `walkdir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSearch;

impl ChangeLocator for BuiltinSearch {
    fn locate(&self, workspace: &Path, target: &str) -> Result<Vec<PathBuf>> {
        let needle = target.as_bytes();
        let mut paths = Vec::new();

        let walker = WalkDir::new(workspace)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");
        for entry in walker {
            let entry = entry.map_err(|e| Error::Search {
                tool: self.name().to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let content = fs::read(entry.path())?;
            if is_binary(&content) || !contains(&content, needle) {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(workspace) {
                paths.push(relative.to_path_buf());
            }
        }

        paths.sort();
        debug!(
            "builtin search found {} candidate files in {}",
            paths.len(),
            workspace.display()
        );
        Ok(paths)
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

fn is_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
